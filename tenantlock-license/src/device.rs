//! Machine fingerprinting for the licensed application.
//!
//! Client-side helper: the server never calls it. A licensed installation
//! links this crate to produce the `machine_hash` it presents when it
//! activates or validates. The hash is stable across restarts and changes
//! when the host identity changes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::env;
use tenantlock_types::MachineHash;

/// A fingerprint of the current machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineFingerprint {
    hash: MachineHash,
    generated_at: chrono::DateTime<chrono::Utc>,
}

impl MachineFingerprint {
    /// Fingerprints the current machine.
    #[must_use]
    pub fn current() -> Self {
        Self::from_components(&collect_machine_ids())
    }

    /// Fingerprints an explicit list of machine identifiers.
    ///
    /// The result is the hex encoding of the first 16 bytes of
    /// `SHA-256(components.join("|"))`.
    #[must_use]
    pub fn from_components(components: &[String]) -> Self {
        let digest = Sha256::digest(components.join("|").as_bytes());
        let mut prefix = [0u8; 16];
        prefix.copy_from_slice(&digest[..16]);
        let hash = MachineHash::from_digest(&prefix);

        Self {
            hash,
            generated_at: chrono::Utc::now(),
        }
    }

    #[must_use]
    pub fn hash(&self) -> &MachineHash {
        &self.hash
    }

    #[must_use]
    pub fn into_hash(self) -> MachineHash {
        self.hash
    }

    /// Returns true if this fingerprint still matches the current machine.
    #[must_use]
    pub fn matches_current(&self) -> bool {
        Self::current().hash == self.hash
    }
}

fn collect_machine_ids() -> Vec<String> {
    let mut ids = vec![env::consts::OS.to_string(), env::consts::ARCH.to_string()];

    ids.push(
        hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown".to_string()),
    );

    if let Some(machine_id) = machine_id() {
        ids.push(machine_id);
    }

    ids
}

fn machine_id() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/etc/machine-id")
            .or_else(|_| std::fs::read_to_string("/var/lib/dbus/machine-id"))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("ioreg")
            .args(["-rd1", "-c", "IOPlatformExpertDevice"])
            .output()
            .ok()
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .and_then(|output| {
                output
                    .lines()
                    .find(|l| l.contains("IOPlatformUUID"))
                    .and_then(|l| l.split('"').nth(3))
                    .map(String::from)
            })
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        None
    }
}
