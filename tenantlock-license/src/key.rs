//! License key format, checksum, and generation.
//!
//! Keys are 20 symbols from a 31-symbol alphabet with no look-alike
//! characters (no `0`/`O`, `1`/`I`/`L`), shown as five groups of four:
//!
//! ```text
//! 7KQX-M3PZ-WH4N-C9RT-BVFE
//! ```
//!
//! The first 19 symbols are random (about 94 bits). The last symbol is a
//! weighted checksum, `sum((i + 1) * value(c_i)) mod 31`. Because 31 is
//! prime and every weight is non-zero and distinct, any single substituted
//! symbol and any swap of two adjacent payload symbols changes the
//! checksum, so most typos are caught before the key ever reaches the
//! store.

use crate::error::{LicenseError, LicenseResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Symbols a key may contain, in value order.
pub const KEY_ALPHABET: &[u8; 31] = b"23456789ABCDEFGHJKMNPQRSTUVWXYZ";

/// Number of random symbols in a key.
pub const PAYLOAD_SYMBOLS: usize = 19;

/// Total symbols in a key (payload plus checksum).
pub const KEY_SYMBOLS: usize = PAYLOAD_SYMBOLS + 1;

/// Symbols per dash-separated group.
pub const GROUP_SIZE: usize = 4;

const RADIX: u32 = KEY_ALPHABET.len() as u32;

/// A well-formed license key whose checksum has been verified.
///
/// The only ways to obtain one are [`LicenseKey::parse`] and a
/// [`KeyGenerator`], so holding a `LicenseKey` means the checksum passed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LicenseKey(String);

impl LicenseKey {
    /// Parses user input into a key.
    ///
    /// Input is trimmed and upper-cased; dashes and spaces are treated as
    /// group separators and may appear anywhere.
    ///
    /// # Errors
    ///
    /// [`LicenseError::InvalidKey`] if the input has the wrong length,
    /// contains a symbol outside [`KEY_ALPHABET`], or fails the checksum.
    pub fn parse(input: &str) -> LicenseResult<Self> {
        let symbols: Vec<u8> = input
            .trim()
            .bytes()
            .filter(|b| *b != b'-' && *b != b' ')
            .map(|b| b.to_ascii_uppercase())
            .collect();

        if symbols.len() != KEY_SYMBOLS {
            return Err(LicenseError::InvalidKey(format!(
                "expected {KEY_SYMBOLS} symbols, found {}",
                symbols.len()
            )));
        }

        let mut values = [0u8; KEY_SYMBOLS];
        for (slot, symbol) in values.iter_mut().zip(&symbols) {
            *slot = symbol_value(*symbol).ok_or_else(|| {
                LicenseError::InvalidKey(format!(
                    "invalid character {:?}",
                    char::from(*symbol)
                ))
            })?;
        }

        let (payload, check) = values.split_at(PAYLOAD_SYMBOLS);
        if checksum(payload) != check[0] {
            return Err(LicenseError::InvalidKey("checksum mismatch".into()));
        }

        Ok(Self(render(&values)))
    }

    /// Builds a key from payload symbol values, appending the checksum.
    fn from_payload(payload: &[u8; PAYLOAD_SYMBOLS]) -> Self {
        let mut values = [0u8; KEY_SYMBOLS];
        values[..PAYLOAD_SYMBOLS].copy_from_slice(payload);
        values[PAYLOAD_SYMBOLS] = checksum(payload);
        Self(render(&values))
    }

    /// Returns the canonical grouped form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LicenseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LicenseKey {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LicenseKey {
    type Error = LicenseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LicenseKey> for String {
    fn from(key: LicenseKey) -> Self {
        key.0
    }
}

/// Source of fresh license keys.
pub trait KeyGenerator: Send + Sync {
    /// Produces a new candidate key. Uniqueness is enforced by the store.
    fn generate(&self) -> LicenseKey;
}

/// Generates keys from the operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomKeyGenerator;

impl KeyGenerator for RandomKeyGenerator {
    fn generate(&self) -> LicenseKey {
        let mut rng = rand::rngs::OsRng;
        let mut payload = [0u8; PAYLOAD_SYMBOLS];
        for value in &mut payload {
            *value = rng.gen_range(0..RADIX) as u8;
        }
        LicenseKey::from_payload(&payload)
    }
}

fn symbol_value(symbol: u8) -> Option<u8> {
    KEY_ALPHABET
        .iter()
        .position(|s| *s == symbol)
        .map(|p| p as u8)
}

fn checksum(payload: &[u8]) -> u8 {
    let sum: u32 = payload
        .iter()
        .enumerate()
        .map(|(i, v)| (i as u32 + 1) * u32::from(*v))
        .sum();
    (sum % RADIX) as u8
}

fn render(values: &[u8; KEY_SYMBOLS]) -> String {
    let mut out = String::with_capacity(KEY_SYMBOLS + KEY_SYMBOLS / GROUP_SIZE);
    for (i, v) in values.iter().enumerate() {
        if i > 0 && i % GROUP_SIZE == 0 {
            out.push('-');
        }
        out.push(char::from(KEY_ALPHABET[usize::from(*v)]));
    }
    out
}
