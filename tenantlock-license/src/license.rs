//! License records and lifecycle state.

use crate::error::{LicenseError, LicenseResult};
use crate::key::LicenseKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tenantlock_types::{LicenseId, MachineHash, PlanType, TenantId};

/// Administrative status of a license.
///
/// Expiry is never stored here; it is derived from the validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    Active,
    Revoked,
}

impl LicenseStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Revoked => "revoked",
        }
    }
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenseStatus {
    type Err = tenantlock_types::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "revoked" => Ok(Self::Revoked),
            other => Err(tenantlock_types::Error::UnknownVariant {
                kind: "license status",
                value: other.to_string(),
            }),
        }
    }
}

/// Where a license sits in the activation lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseState {
    /// Active and not yet bound to a machine.
    Issued,
    /// Active and bound to exactly one machine.
    Bound(MachineHash),
    /// Revoked; any binding is kept for audit.
    Revoked { machine_hash: Option<MachineHash> },
}

/// An issued license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub license_id: LicenseId,
    pub key: LicenseKey,
    pub tenant_id: TenantId,
    pub plan_type: PlanType,
    pub machine_hash: Option<MachineHash>,
    pub status: LicenseStatus,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl License {
    /// Returns the lifecycle state derived from status and binding.
    #[must_use]
    pub fn state(&self) -> LicenseState {
        match (self.status, &self.machine_hash) {
            (LicenseStatus::Revoked, hash) => LicenseState::Revoked {
                machine_hash: hash.clone(),
            },
            (LicenseStatus::Active, None) => LicenseState::Issued,
            (LicenseStatus::Active, Some(hash)) => LicenseState::Bound(hash.clone()),
        }
    }

    /// Checks revocation, then the validity window, at the given instant.
    ///
    /// Revocation is reported ahead of expiry. The window is inclusive on
    /// both ends.
    pub fn check_usable_at(&self, now: DateTime<Utc>) -> LicenseResult<()> {
        if self.status == LicenseStatus::Revoked {
            return Err(LicenseError::Revoked);
        }
        if now < self.valid_from {
            return Err(LicenseError::NotYetValid(self.valid_from));
        }
        if now > self.valid_until {
            return Err(LicenseError::Expired(self.valid_until));
        }
        Ok(())
    }
}
