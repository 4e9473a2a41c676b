//! Tenant routing for tenantlock.
//!
//! - [`TenantResolver`] maps a request host to a tenant by custom domain
//!   or by subdomain of the platform base domain.
//! - [`ConfigStore`] holds platform settings such as
//!   [`BASE_PLATFORM_DOMAIN`], read fresh on every resolution.

mod config_store;
mod error;
mod host;
mod resolver;

pub use config_store::{ConfigEntry, ConfigStore, BASE_PLATFORM_DOMAIN};
pub use error::{TenantError, TenantResult};
pub use host::{normalize_host, subdomain_of};
pub use resolver::TenantResolver;
