#![allow(dead_code)]

use std::sync::Arc;
use tenantlock_storage::{Database, TenantTable};
use tenantlock_tenant::{ConfigStore, TenantResolver, BASE_PLATFORM_DOMAIN};
use tenantlock_types::Tenant;

pub struct Fixture {
    pub tenants: TenantTable,
    pub config: ConfigStore,
    pub resolver: TenantResolver,
}

/// In-memory directory with `example.com` as the base domain.
pub fn fixture() -> Fixture {
    let db = Database::open_in_memory().unwrap();
    let tenants = TenantTable::new(db.clone());
    let config = ConfigStore::new(db);
    config
        .set(BASE_PLATFORM_DOMAIN, "example.com", Some("platform base domain"))
        .unwrap();
    let resolver = TenantResolver::new(Arc::new(tenants.clone()), config.clone());
    Fixture {
        tenants,
        config,
        resolver,
    }
}

impl Fixture {
    pub fn add(&self, tenant: Tenant) -> Tenant {
        self.tenants.insert(&tenant).unwrap();
        tenant
    }
}
