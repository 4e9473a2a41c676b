//! Tenant records as published by the client-management service.

use crate::{Error, TenantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a tenant is allowed to serve traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    #[default]
    Active,
    Blocked,
}

impl TenantStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TenantStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "blocked" => Ok(Self::Blocked),
            other => Err(Error::UnknownVariant {
                kind: "tenant status",
                value: other.to_string(),
            }),
        }
    }
}

/// A client organization.
///
/// `subdomain` and `custom_domain` are each globally unique when present
/// and are always held in lower case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub tenant_id: TenantId,
    pub name: String,
    pub status: TenantStatus,
    pub subdomain: Option<String>,
    pub custom_domain: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    /// Creates an active tenant with no domains attached.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            tenant_id: TenantId::new(),
            name: name.into(),
            status: TenantStatus::Active,
            subdomain: None,
            custom_domain: None,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_subdomain(mut self, subdomain: &str) -> Self {
        self.subdomain = Some(subdomain.trim().to_ascii_lowercase());
        self
    }

    #[must_use]
    pub fn with_custom_domain(mut self, domain: &str) -> Self {
        self.custom_domain = Some(domain.trim().trim_end_matches('.').to_ascii_lowercase());
        self
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == TenantStatus::Active
    }
}
