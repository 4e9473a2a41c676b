//! Platform-wide key/value settings.
//!
//! Values are read from the database on every call so changes made through
//! the admin surface apply to the next request without a restart.

use crate::error::{TenantError, TenantResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tenantlock_storage::Database;
use tracing::{debug, info};

/// Config key holding the platform base domain, e.g. `example.com`.
pub const BASE_PLATFORM_DOMAIN: &str = "BASE_PLATFORM_DOMAIN";

/// One stored setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// SQLite-backed settings store.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    db: Database,
}

impl ConfigStore {
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns the value for `key`.
    ///
    /// # Errors
    ///
    /// [`TenantError::ConfigNotFound`] if the key is not set.
    pub fn get(&self, key: &str) -> TenantResult<String> {
        self.entry(key)?
            .map(|entry| entry.value)
            .ok_or_else(|| TenantError::ConfigNotFound(key.to_string()))
    }

    /// Returns the full entry for `key`, if set.
    pub fn entry(&self, key: &str) -> TenantResult<Option<ConfigEntry>> {
        self.db.with_read(|conn| select_entry(conn, key))
    }

    /// Creates or updates a setting.
    ///
    /// A `None` description leaves an existing description unchanged.
    ///
    /// # Errors
    ///
    /// [`TenantError::InvalidInput`] if the key is blank.
    pub fn set(&self, key: &str, value: &str, description: Option<&str>) -> TenantResult<ConfigEntry> {
        let key = validate_key(key)?;
        let entry = self.db.with_tx(|tx| {
            tx.execute(
                "INSERT INTO platform_config (key, value, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)
                 ON CONFLICT (key) DO UPDATE SET
                     value = excluded.value,
                     description = COALESCE(excluded.description, platform_config.description),
                     updated_at = excluded.updated_at",
                params![key, value, description, Utc::now()],
            )?;
            select_entry(tx, key)?.ok_or_else(|| TenantError::ConfigNotFound(key.to_string()))
        })?;
        info!("Config {} set", key);
        Ok(entry)
    }

    /// Writes a setting only if it is not present yet. Returns true if the
    /// default was written.
    pub fn seed_default(&self, key: &str, value: &str, description: Option<&str>) -> TenantResult<bool> {
        let key = validate_key(key)?;
        let inserted = self.db.with_conn(|conn| {
            let now = Utc::now();
            let changed = conn.execute(
                "INSERT OR IGNORE INTO platform_config (key, value, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![key, value, description, now],
            )?;
            Ok::<_, TenantError>(changed > 0)
        })?;
        if inserted {
            info!("Seeded config {} with default {}", key, value);
        } else {
            debug!("Config {} already set, keeping stored value", key);
        }
        Ok(inserted)
    }

    /// Lists all settings ordered by key.
    pub fn list(&self) -> TenantResult<Vec<ConfigEntry>> {
        self.db.with_read(|conn| {
            let mut stmt = conn.prepare(
                "SELECT key, value, description, created_at, updated_at
                 FROM platform_config ORDER BY key",
            )?;
            let rows = stmt.query_map([], entry_from_row)?;
            let mut entries = Vec::new();
            for row in rows {
                entries.push(row?);
            }
            Ok(entries)
        })
    }
}

fn validate_key(key: &str) -> TenantResult<&str> {
    let key = key.trim();
    if key.is_empty() {
        return Err(TenantError::InvalidInput("config key must not be empty".into()));
    }
    Ok(key)
}

fn select_entry(conn: &Connection, key: &str) -> TenantResult<Option<ConfigEntry>> {
    let entry = conn
        .query_row(
            "SELECT key, value, description, created_at, updated_at
             FROM platform_config WHERE key = ?1",
            params![key.trim()],
            entry_from_row,
        )
        .optional()?;
    Ok(entry)
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<ConfigEntry> {
    Ok(ConfigEntry {
        key: row.get(0)?,
        value: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}
