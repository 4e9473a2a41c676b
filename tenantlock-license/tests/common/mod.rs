//! Shared test helpers for license tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;
use tempfile::TempDir;
use tenantlock_license::{ActivationEngine, KeyGenerator, License, LicenseKey, LicenseStore};
use tenantlock_storage::{Database, TenantTable};
use tenantlock_types::{MachineHash, PlanType, Tenant, TenantId};

/// A file-backed store with one registered tenant.
///
/// A file database gets the reader pool, so lookups here run on the same
/// connections they do in production.
pub struct Fixture {
    _dir: TempDir,
    pub db: Database,
    pub tenants: TenantTable,
    pub tenant_id: TenantId,
    pub store: LicenseStore,
    pub engine: ActivationEngine,
}

pub fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(&dir.path().join("licenses.db")).unwrap();
    let tenants = TenantTable::new(db.clone());
    let tenant = Tenant::new("Acme").with_subdomain("acme");
    tenants.insert(&tenant).unwrap();
    let store = LicenseStore::new(db.clone());
    let engine = ActivationEngine::new(store.clone());
    Fixture {
        _dir: dir,
        db,
        tenants,
        tenant_id: tenant.tenant_id,
        store,
        engine,
    }
}

impl Fixture {
    /// Issues a basic license valid for a year starting now.
    pub fn issue(&self) -> License {
        self.store
            .issue_for_days(self.tenant_id, PlanType::Basic, 365)
            .unwrap()
    }

    /// Issues a license with an explicit window.
    pub fn issue_window(&self, from: DateTime<Utc>, until: DateTime<Utc>) -> License {
        self.store
            .issue(self.tenant_id, PlanType::Pro, from, until)
            .unwrap()
    }
}

pub fn hash(value: &str) -> MachineHash {
    MachineHash::new(value).unwrap()
}

pub fn days(n: i64) -> Duration {
    Duration::days(n)
}

/// Hands out a fixed sequence of keys, repeating the last one forever.
pub struct ScriptedKeys {
    keys: Mutex<Vec<LicenseKey>>,
}

impl ScriptedKeys {
    pub fn new(keys: &[&str]) -> Self {
        let mut keys: Vec<LicenseKey> = keys.iter().map(|k| LicenseKey::parse(k).unwrap()).collect();
        keys.reverse();
        Self {
            keys: Mutex::new(keys),
        }
    }
}

impl KeyGenerator for ScriptedKeys {
    fn generate(&self) -> LicenseKey {
        let mut keys = self.keys.lock().unwrap();
        if keys.len() > 1 {
            keys.pop().unwrap()
        } else {
            keys[0].clone()
        }
    }
}

/// Valid keys with hand-computed checksums.
pub const KEY_ZERO: &str = "2222-2222-2222-2222-2222";
pub const KEY_ONE: &str = "3222-2222-2222-2222-2223";
