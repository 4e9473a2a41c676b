//! Tenant rows.
//!
//! Tenants are owned by the client-management service. The licensing and
//! routing code only ever reads them through [`TenantDirectory`];
//! [`TenantTable`] additionally exposes the writes that service performs.

use crate::database::Database;
use crate::error::{is_unique_violation, StorageError, StorageResult};
use crate::row::parse_column;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tenantlock_types::{Tenant, TenantId, TenantStatus};
use tracing::info;

const TENANT_COLUMNS: &str = "tenant_id, name, status, subdomain, custom_domain, created_at";

/// Read-only view of the tenant directory.
///
/// Domain lookups are case-insensitive and match at most one tenant.
pub trait TenantDirectory: Send + Sync {
    /// Looks up a tenant by id.
    fn tenant(&self, tenant_id: &TenantId) -> StorageResult<Option<Tenant>>;

    /// Looks up the tenant bound to an exact custom domain.
    fn tenant_by_custom_domain(&self, domain: &str) -> StorageResult<Option<Tenant>>;

    /// Looks up the tenant owning a platform subdomain label.
    fn tenant_by_subdomain(&self, subdomain: &str) -> StorageResult<Option<Tenant>>;
}

/// SQLite-backed tenant directory.
#[derive(Clone, Debug)]
pub struct TenantTable {
    db: Database,
}

impl TenantTable {
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Inserts a tenant.
    ///
    /// # Errors
    ///
    /// [`StorageError::Conflict`] if the subdomain or custom domain is
    /// already taken.
    pub fn insert(&self, tenant: &Tenant) -> StorageResult<()> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tenants (tenant_id, name, status, subdomain, custom_domain, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    tenant.tenant_id.to_string(),
                    tenant.name,
                    tenant.status.as_str(),
                    normalize_label(tenant.subdomain.as_deref()),
                    normalize_label(tenant.custom_domain.as_deref()),
                    tenant.created_at,
                ],
            )
            .map_err(|e| conflict_or(e, "subdomain or custom domain already in use"))?;
            Ok::<_, StorageError>(())
        })?;
        info!("Registered tenant {}", tenant.tenant_id);
        Ok(())
    }

    /// Replaces a tenant's subdomain and custom domain. Returns false if the
    /// tenant does not exist.
    pub fn set_domains(
        &self,
        tenant_id: &TenantId,
        subdomain: Option<&str>,
        custom_domain: Option<&str>,
    ) -> StorageResult<bool> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE tenants SET subdomain = ?2, custom_domain = ?3 WHERE tenant_id = ?1",
                    params![
                        tenant_id.to_string(),
                        normalize_label(subdomain),
                        normalize_label(custom_domain),
                    ],
                )
                .map_err(|e| conflict_or(e, "subdomain or custom domain already in use"))?;
            Ok(changed > 0)
        })
    }

    /// Sets a tenant's status. Returns false if the tenant does not exist.
    pub fn set_status(&self, tenant_id: &TenantId, status: TenantStatus) -> StorageResult<bool> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE tenants SET status = ?2 WHERE tenant_id = ?1",
                params![tenant_id.to_string(), status.as_str()],
            )?;
            Ok(changed > 0)
        })
    }

    /// Deletes a tenant row. Returns false if it did not exist.
    ///
    /// Licenses are not touched here; use the license store's tenant
    /// removal to revoke them in the same transaction.
    pub fn delete(&self, tenant_id: &TenantId) -> StorageResult<bool> {
        self.db.with_conn(|conn| Self::delete_in(conn, tenant_id))
    }

    /// Deletes a tenant row on an open connection or transaction.
    pub fn delete_in(conn: &Connection, tenant_id: &TenantId) -> StorageResult<bool> {
        let changed = conn.execute(
            "DELETE FROM tenants WHERE tenant_id = ?1",
            params![tenant_id.to_string()],
        )?;
        if changed > 0 {
            info!("Deleted tenant {}", tenant_id);
        }
        Ok(changed > 0)
    }

    /// Lists all tenants, newest first.
    pub fn list(&self) -> StorageResult<Vec<Tenant>> {
        self.db.with_read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TENANT_COLUMNS} FROM tenants ORDER BY created_at DESC"
            ))?;
            let rows = stmt.query_map([], tenant_from_row)?;
            let mut tenants = Vec::new();
            for row in rows {
                tenants.push(row?);
            }
            Ok(tenants)
        })
    }

    fn find_one(&self, column: &str, value: &str) -> StorageResult<Option<Tenant>> {
        self.db.with_read(|conn| {
            let tenant = conn
                .query_row(
                    &format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE {column} = ?1"),
                    params![value],
                    tenant_from_row,
                )
                .optional()?;
            Ok(tenant)
        })
    }
}

impl TenantDirectory for TenantTable {
    fn tenant(&self, tenant_id: &TenantId) -> StorageResult<Option<Tenant>> {
        self.find_one("tenant_id", &tenant_id.to_string())
    }

    fn tenant_by_custom_domain(&self, domain: &str) -> StorageResult<Option<Tenant>> {
        self.find_one("custom_domain", domain)
    }

    fn tenant_by_subdomain(&self, subdomain: &str) -> StorageResult<Option<Tenant>> {
        self.find_one("subdomain", subdomain)
    }
}

fn tenant_from_row(row: &Row<'_>) -> rusqlite::Result<Tenant> {
    Ok(Tenant {
        tenant_id: parse_column(row, 0)?,
        name: row.get(1)?,
        status: parse_column(row, 2)?,
        subdomain: row.get(3)?,
        custom_domain: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Blank labels are stored as NULL so they never collide on UNIQUE.
fn normalize_label(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().trim_end_matches('.').to_ascii_lowercase())
        .filter(|v| !v.is_empty())
}

fn conflict_or(err: rusqlite::Error, message: &str) -> StorageError {
    if is_unique_violation(&err) {
        StorageError::Conflict(message.to_string())
    } else {
        err.into()
    }
}

