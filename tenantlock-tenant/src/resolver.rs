//! Maps an incoming request host to the tenant it belongs to.
//!
//! Resolution order:
//! 1. exact match on a tenant's custom domain
//! 2. `<label>.<BASE_PLATFORM_DOMAIN>` matched on the tenant subdomain
//!
//! Custom domains and subdomains are unique, so at most one tenant can
//! match at each step.

use crate::config_store::{ConfigStore, BASE_PLATFORM_DOMAIN};
use crate::error::{TenantError, TenantResult};
use crate::host::{normalize_host, subdomain_of};
use std::sync::Arc;
use tenantlock_storage::TenantDirectory;
use tenantlock_types::Tenant;
use tracing::debug;

/// Host-to-tenant resolver.
#[derive(Clone)]
pub struct TenantResolver {
    directory: Arc<dyn TenantDirectory>,
    config: ConfigStore,
}

impl TenantResolver {
    pub fn new(directory: Arc<dyn TenantDirectory>, config: ConfigStore) -> Self {
        Self { directory, config }
    }

    /// Resolves a host to its tenant, whatever the tenant's status.
    ///
    /// The base domain is read from the config store on each call.
    ///
    /// # Errors
    ///
    /// [`TenantError::TenantNotFound`] for a blank host, the bare base
    /// domain, or a host no tenant claims.
    pub fn resolve(&self, host: &str) -> TenantResult<Tenant> {
        let host = normalize_host(host);
        if host.is_empty() {
            return Err(TenantError::TenantNotFound("empty host".into()));
        }

        if let Some(tenant) = self.directory.tenant_by_custom_domain(&host)? {
            debug!("Host {} resolved by custom domain", host);
            return Ok(tenant);
        }

        let base = match self.config.entry(BASE_PLATFORM_DOMAIN)? {
            Some(entry) => normalize_host(&entry.value),
            None => {
                debug!("{} is not configured", BASE_PLATFORM_DOMAIN);
                String::new()
            }
        };

        if let Some(label) = subdomain_of(&host, &base) {
            if let Some(tenant) = self.directory.tenant_by_subdomain(label)? {
                debug!("Host {} resolved by subdomain {}", host, label);
                return Ok(tenant);
            }
        }

        Err(TenantError::TenantNotFound(host))
    }

    /// Resolves a host and rejects tenants that are blocked.
    pub fn resolve_active(&self, host: &str) -> TenantResult<Tenant> {
        let tenant = self.resolve(host)?;
        if !tenant.is_active() {
            return Err(TenantError::Blocked(tenant.tenant_id));
        }
        Ok(tenant)
    }

    #[must_use]
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }
}

impl std::fmt::Debug for TenantResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
