//! Error types for tenant resolution and platform configuration.

use tenantlock_storage::StorageError;
use tenantlock_types::TenantId;
use thiserror::Error;

/// Errors from tenant resolution and platform configuration.
#[derive(Debug, Error)]
pub enum TenantError {
    /// No tenant serves the given host or id.
    #[error("tenant not found: {0}")]
    TenantNotFound(String),

    #[error("config key not found: {0}")]
    ConfigNotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The tenant exists but is not allowed to serve traffic.
    #[error("tenant {0} is blocked")]
    Blocked(TenantId),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<rusqlite::Error> for TenantError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.into())
    }
}

pub type TenantResult<T> = Result<T, TenantError>;
