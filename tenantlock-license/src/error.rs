//! Error types for the licensing module.

use chrono::{DateTime, Utc};
use tenantlock_storage::StorageError;
use tenantlock_types::TenantId;
use thiserror::Error;

/// Licensing-specific errors.
///
/// Every variant except [`LicenseError::Storage`] is a definite outcome
/// that retrying will not change.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// No license matches the given key or id.
    #[error("license not found")]
    NotFound,

    /// Issuance referenced a tenant the directory does not know.
    #[error("tenant not found: {0}")]
    TenantNotFound(TenantId),

    /// `valid_until` is not after `valid_from`, or the duration is unusable.
    #[error("invalid validity range: {0}")]
    InvalidRange(String),

    /// Malformed request payload.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Key has the wrong shape or fails its checksum.
    #[error("invalid license key: {0}")]
    InvalidKey(String),

    /// Activation presented a fingerprint other than the bound one.
    #[error("license is already bound to another machine")]
    AlreadyBound,

    /// License administratively disabled.
    #[error("license has been revoked")]
    Revoked,

    /// License has expired.
    #[error("license expired on {0}")]
    Expired(DateTime<Utc>),

    /// License validity window has not started yet.
    #[error("license is not valid until {0}")]
    NotYetValid(DateTime<Utc>),

    /// Validation before the first successful activation.
    #[error("license not activated")]
    NotActivated,

    /// Validation presented a fingerprint other than the bound one.
    #[error("machine fingerprint does not match the activated machine")]
    MachineMismatch,

    /// Every generated key collided with an existing one.
    #[error("could not generate a unique license key after {0} attempts")]
    KeyGenerationExhausted(u32),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<rusqlite::Error> for LicenseError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.into())
    }
}

impl From<tenantlock_types::Error> for LicenseError {
    fn from(err: tenantlock_types::Error) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
