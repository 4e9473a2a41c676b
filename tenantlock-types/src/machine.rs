//! Machine fingerprints presented by licensed installations.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest fingerprint the store accepts.
pub const MAX_MACHINE_HASH_LEN: usize = 255;

/// An opaque identifier for one physical or virtual machine.
///
/// Compared byte-for-byte; only surrounding whitespace is trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MachineHash(String);

impl MachineHash {
    /// Validates and wraps a fingerprint string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMachineHash`] if the value is empty after
    /// trimming, longer than [`MAX_MACHINE_HASH_LEN`], or contains control
    /// characters.
    pub fn new(value: impl AsRef<str>) -> Result<Self, Error> {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return Err(Error::InvalidMachineHash("must not be empty".into()));
        }
        if value.len() > MAX_MACHINE_HASH_LEN {
            return Err(Error::InvalidMachineHash(format!(
                "must be at most {MAX_MACHINE_HASH_LEN} bytes"
            )));
        }
        if value.chars().any(char::is_control) {
            return Err(Error::InvalidMachineHash(
                "must not contain control characters".into(),
            ));
        }
        Ok(Self(value.to_string()))
    }

    /// Wraps a 128-bit digest as its lowercase hex encoding.
    ///
    /// Always valid: 32 hex characters pass every check in [`MachineHash::new`].
    #[must_use]
    pub fn from_digest(digest: &[u8; 16]) -> Self {
        Self(hex::encode(digest))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MachineHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MachineHash {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MachineHash> for String {
    fn from(hash: MachineHash) -> Self {
        hash.0
    }
}

impl std::str::FromStr for MachineHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
