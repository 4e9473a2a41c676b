//! Core type definitions for tenantlock.
//!
//! This crate holds the plain data shared by every other crate:
//! - License and tenant identifiers (UUID v7)
//! - Plan tiers and tenant status
//! - Tenant records as published by the client-management service
//! - Machine fingerprints
//!
//! Behavior (issuance, activation, resolution) lives in the crates that
//! own the corresponding records.

mod ids;
mod machine;
mod plan;
mod tenant;

pub use ids::{LicenseId, TenantId};
pub use machine::{MachineHash, MAX_MACHINE_HASH_LEN};
pub use plan::PlanType;
pub use tenant::{Tenant, TenantStatus};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing or parsing types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("invalid machine hash: {0}")]
    InvalidMachineHash(String),
}
