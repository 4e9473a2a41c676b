//! License issuance and node-locked activation for tenantlock.
//!
//! This crate handles:
//! - Generating typable license keys with a typo-catching checksum
//! - Issuing, listing, revoking, and resetting licenses
//! - Binding a license to exactly one machine fingerprint
//! - Validating a license for a machine at runtime
//!
//! [`MachineFingerprint`] is a client-side helper for licensed
//! installations to compute the machine hash they present; the server only
//! receives hashes and never fingerprints its own host.
//!
//! # Lifecycle
//!
//! A license is `Issued` until its first activation binds it to a machine,
//! after which it is `Bound`. Revocation moves it to `Revoked` from either
//! state and keeps the binding for audit. Expiry is never stored; it is
//! evaluated from `valid_until` on every check.
//!
//! # Key Format
//!
//! `XXXX-XXXX-XXXX-XXXX-XXXC`: 19 random symbols from
//! [`KEY_ALPHABET`] followed by a checksum symbol `C`.

mod activation;
mod device;
mod error;
mod key;
mod license;
mod store;

pub use activation::{Activation, ActivationEngine};
pub use device::MachineFingerprint;
pub use error::{LicenseError, LicenseResult};
pub use key::{
    KeyGenerator, LicenseKey, RandomKeyGenerator, GROUP_SIZE, KEY_ALPHABET, KEY_SYMBOLS,
    PAYLOAD_SYMBOLS,
};
pub use license::{License, LicenseState, LicenseStatus};
pub use store::{BindResult, LicenseStore, MAX_KEY_ATTEMPTS};
