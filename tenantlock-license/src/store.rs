//! Durable license records.
//!
//! [`LicenseStore`] is the only writer of the `licenses` table. Writes that
//! must not race are expressed as conditional SQL so they stay atomic even
//! if several processes share the database file:
//! - key uniqueness is the table's UNIQUE constraint, checked on insert
//! - the tenant must exist at the instant of insert (`INSERT ... SELECT
//!   ... WHERE EXISTS`), and tenant removal revokes and deletes in one
//!   transaction, so no active license outlives its tenant
//! - binding is `UPDATE ... WHERE machine_hash IS NULL AND status = 'active'`
//!
//! Lookups and listings run on the database's reader pool.

use crate::error::{LicenseError, LicenseResult};
use crate::key::{KeyGenerator, LicenseKey, RandomKeyGenerator};
use crate::license::{License, LicenseStatus};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Arc;
use tenantlock_storage::{parse_column, parse_optional_column, Database, StorageError, TenantTable};
use tenantlock_types::{LicenseId, MachineHash, PlanType, TenantId};
use tracing::{debug, info, warn};

/// Maximum number of keys tried before issuance gives up.
pub const MAX_KEY_ATTEMPTS: u32 = 5;

const LICENSE_COLUMNS: &str = "license_id, key, tenant_id, plan_type, machine_hash, status, \
                               valid_from, valid_until, created_at, updated_at";

/// Outcome of [`LicenseStore::bind_machine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindResult {
    /// This call bound the license to the presented machine.
    Bound(License),
    /// The license was already bound to the presented machine.
    AlreadyBoundToSame(License),
    /// The license is bound to a different machine.
    BoundToOther(License),
}

/// Store for license records.
#[derive(Clone)]
pub struct LicenseStore {
    db: Database,
    keys: Arc<dyn KeyGenerator>,
}

impl LicenseStore {
    /// Creates a store issuing keys from [`RandomKeyGenerator`].
    pub fn new(db: Database) -> Self {
        Self {
            db,
            keys: Arc::new(RandomKeyGenerator),
        }
    }

    /// Replaces the key generator.
    #[must_use]
    pub fn with_key_generator(mut self, keys: Arc<dyn KeyGenerator>) -> Self {
        self.keys = keys;
        self
    }

    /// Issues a new license for a tenant.
    ///
    /// # Errors
    ///
    /// - [`LicenseError::InvalidRange`] if `valid_until <= valid_from`
    /// - [`LicenseError::TenantNotFound`] if the tenant does not exist
    /// - [`LicenseError::KeyGenerationExhausted`] if every candidate key collided
    pub fn issue(
        &self,
        tenant_id: TenantId,
        plan_type: PlanType,
        valid_from: DateTime<Utc>,
        valid_until: DateTime<Utc>,
    ) -> LicenseResult<License> {
        if valid_until <= valid_from {
            return Err(LicenseError::InvalidRange(format!(
                "valid_until ({valid_until}) must be after valid_from ({valid_from})"
            )));
        }
        let now = Utc::now();
        for attempt in 1..=MAX_KEY_ATTEMPTS {
            let license = License {
                license_id: LicenseId::new(),
                key: self.keys.generate(),
                tenant_id,
                plan_type,
                machine_hash: None,
                status: LicenseStatus::Active,
                valid_from,
                valid_until,
                created_at: now,
                updated_at: now,
            };

            match self.db.with_conn(|conn| insert_license(conn, &license)) {
                Ok(0) => return Err(LicenseError::TenantNotFound(tenant_id)),
                Ok(_) => {
                    info!(
                        "Issued {} license {} for tenant {}",
                        license.plan_type, license.license_id, license.tenant_id
                    );
                    return Ok(license);
                }
                Err(LicenseError::Storage(e)) if e.is_unique_violation() => {
                    warn!("License key collision on attempt {attempt}, regenerating");
                }
                Err(e) => return Err(e),
            }
        }

        Err(LicenseError::KeyGenerationExhausted(MAX_KEY_ATTEMPTS))
    }

    /// Issues a license valid from now for `days_valid` days.
    pub fn issue_for_days(
        &self,
        tenant_id: TenantId,
        plan_type: PlanType,
        days_valid: i64,
    ) -> LicenseResult<License> {
        if days_valid <= 0 {
            return Err(LicenseError::InvalidRange(format!(
                "days_valid must be positive, got {days_valid}"
            )));
        }
        let valid_from = Utc::now();
        let valid_until = Duration::try_days(days_valid)
            .and_then(|d| valid_from.checked_add_signed(d))
            .ok_or_else(|| {
                LicenseError::InvalidRange(format!("days_valid {days_valid} is out of range"))
            })?;
        self.issue(tenant_id, plan_type, valid_from, valid_until)
    }

    /// Looks up a license by id.
    pub fn get(&self, license_id: &LicenseId) -> LicenseResult<License> {
        self.db
            .with_read(|conn| select_by_id(conn, license_id))?
            .ok_or(LicenseError::NotFound)
    }

    /// Looks up a license by user-supplied key text.
    ///
    /// The key is parsed and checksum-verified before the store is touched.
    pub fn get_by_key(&self, key: &str) -> LicenseResult<License> {
        let key = LicenseKey::parse(key)?;
        self.find_by_key(&key)
    }

    /// Looks up a license by an already-verified key.
    pub fn find_by_key(&self, key: &LicenseKey) -> LicenseResult<License> {
        self.db
            .with_read(|conn| {
                conn.query_row(
                    &format!("SELECT {LICENSE_COLUMNS} FROM licenses WHERE key = ?1"),
                    params![key.as_str()],
                    license_from_row,
                )
                .optional()
                .map_err(LicenseError::from)
            })?
            .ok_or(LicenseError::NotFound)
    }

    /// Lists a tenant's licenses, newest first.
    pub fn list_by_tenant(&self, tenant_id: &TenantId) -> LicenseResult<Vec<License>> {
        self.db.with_read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LICENSE_COLUMNS} FROM licenses WHERE tenant_id = ?1
                 ORDER BY created_at DESC, license_id DESC"
            ))?;
            let rows = stmt.query_map(params![tenant_id.to_string()], license_from_row)?;
            collect_rows(rows)
        })
    }

    /// Lists every license, newest first.
    pub fn list_all(&self) -> LicenseResult<Vec<License>> {
        self.db.with_read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LICENSE_COLUMNS} FROM licenses ORDER BY created_at DESC, license_id DESC"
            ))?;
            let rows = stmt.query_map([], license_from_row)?;
            collect_rows(rows)
        })
    }

    /// Revokes or reactivates a license. Setting the current status again
    /// is a no-op that still returns the record.
    pub fn set_status(&self, license_id: &LicenseId, status: LicenseStatus) -> LicenseResult<License> {
        let license = self.db.with_tx(|tx| {
            tx.execute(
                "UPDATE licenses SET status = ?2, updated_at = ?3
                 WHERE license_id = ?1 AND status <> ?2",
                params![license_id.to_string(), status.as_str(), Utc::now()],
            )?;
            select_by_id(tx, license_id)?.ok_or(LicenseError::NotFound)
        })?;
        info!("License {} status set to {}", license_id, status);
        Ok(license)
    }

    /// Binds a license to a machine if it is not bound yet.
    ///
    /// This is the only path that sets `machine_hash`. The update is a
    /// compare-and-set on a NULL hash, so of two concurrent calls with
    /// different hashes exactly one gets [`BindResult::Bound`] and the
    /// other sees [`BindResult::BoundToOther`].
    ///
    /// # Errors
    ///
    /// [`LicenseError::NotFound`] if the license does not exist and
    /// [`LicenseError::Revoked`] if it was revoked.
    pub fn bind_machine(
        &self,
        license_id: &LicenseId,
        machine_hash: &MachineHash,
    ) -> LicenseResult<BindResult> {
        let result = self.db.with_tx(|tx| {
            let changed = tx.execute(
                "UPDATE licenses SET machine_hash = ?2, updated_at = ?3
                 WHERE license_id = ?1 AND machine_hash IS NULL AND status = 'active'",
                params![license_id.to_string(), machine_hash.as_str(), Utc::now()],
            )?;
            let license = select_by_id(tx, license_id)?.ok_or(LicenseError::NotFound)?;
            if changed == 1 {
                return Ok(BindResult::Bound(license));
            }
            if license.status == LicenseStatus::Revoked {
                return Err(LicenseError::Revoked);
            }
            match &license.machine_hash {
                Some(bound) if bound == machine_hash => Ok(BindResult::AlreadyBoundToSame(license)),
                Some(_) => Ok(BindResult::BoundToOther(license)),
                None => Err(StorageError::InvalidData(format!(
                    "license {license_id} is active and unbound but could not be bound"
                ))
                .into()),
            }
        })?;
        if let BindResult::Bound(_) = result {
            info!("License {} bound to machine", license_id);
        }
        Ok(result)
    }

    /// Clears the machine binding so the license can be activated again.
    ///
    /// Administrative capability; activation never clears a binding.
    ///
    /// # Errors
    ///
    /// [`LicenseError::Revoked`] if the license is revoked; its binding is
    /// kept for audit and cannot be cleared.
    pub fn reset_binding(&self, license_id: &LicenseId) -> LicenseResult<License> {
        let license = self.db.with_tx(|tx| {
            tx.execute(
                "UPDATE licenses SET machine_hash = NULL, updated_at = ?2
                 WHERE license_id = ?1 AND machine_hash IS NOT NULL AND status = 'active'",
                params![license_id.to_string(), Utc::now()],
            )?;
            let license = select_by_id(tx, license_id)?.ok_or(LicenseError::NotFound)?;
            if license.status == LicenseStatus::Revoked {
                return Err(LicenseError::Revoked);
            }
            Ok(license)
        })?;
        info!("License {} machine binding reset", license_id);
        Ok(license)
    }

    /// Revokes every active license of a tenant. Returns how many changed.
    pub fn revoke_all_for_tenant(&self, tenant_id: &TenantId) -> LicenseResult<usize> {
        self.db.with_conn(|conn| revoke_tenant_licenses(conn, tenant_id))
    }

    /// Removes a tenant: revokes its active licenses and deletes the tenant
    /// row in one transaction. License rows are kept for audit. Returns how
    /// many licenses were revoked.
    ///
    /// # Errors
    ///
    /// [`LicenseError::TenantNotFound`] if the tenant does not exist, in
    /// which case nothing is changed.
    pub fn remove_tenant(&self, tenant_id: &TenantId) -> LicenseResult<usize> {
        let revoked = self.db.with_tx(|tx| {
            let revoked = revoke_tenant_licenses(tx, tenant_id)?;
            if !TenantTable::delete_in(tx, tenant_id)? {
                return Err(LicenseError::TenantNotFound(*tenant_id));
            }
            Ok(revoked)
        })?;
        info!("Removed tenant {} and revoked {} licenses", tenant_id, revoked);
        Ok(revoked)
    }
}

impl std::fmt::Debug for LicenseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LicenseStore").field("db", &self.db).finish_non_exhaustive()
    }
}

/// Inserts only if the tenant exists. Returns the number of rows written.
fn insert_license(conn: &Connection, license: &License) -> LicenseResult<usize> {
    let changed = conn.execute(
        "INSERT INTO licenses (license_id, key, tenant_id, plan_type, machine_hash, status,
                               valid_from, valid_until, created_at, updated_at)
         SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10
         WHERE EXISTS (SELECT 1 FROM tenants WHERE tenant_id = ?3)",
        params![
            license.license_id.to_string(),
            license.key.as_str(),
            license.tenant_id.to_string(),
            license.plan_type.as_str(),
            license.machine_hash.as_ref().map(MachineHash::as_str),
            license.status.as_str(),
            license.valid_from,
            license.valid_until,
            license.created_at,
            license.updated_at,
        ],
    )?;
    Ok(changed)
}

fn revoke_tenant_licenses(conn: &Connection, tenant_id: &TenantId) -> LicenseResult<usize> {
    let changed = conn.execute(
        "UPDATE licenses SET status = 'revoked', updated_at = ?2
         WHERE tenant_id = ?1 AND status = 'active'",
        params![tenant_id.to_string(), Utc::now()],
    )?;
    debug!("Revoked {changed} licenses of tenant {tenant_id}");
    Ok(changed)
}

fn select_by_id(conn: &Connection, license_id: &LicenseId) -> LicenseResult<Option<License>> {
    let license = conn
        .query_row(
            &format!("SELECT {LICENSE_COLUMNS} FROM licenses WHERE license_id = ?1"),
            params![license_id.to_string()],
            license_from_row,
        )
        .optional()?;
    Ok(license)
}

fn collect_rows(
    rows: impl Iterator<Item = rusqlite::Result<License>>,
) -> LicenseResult<Vec<License>> {
    let mut licenses = Vec::new();
    for row in rows {
        licenses.push(row?);
    }
    Ok(licenses)
}

fn license_from_row(row: &Row<'_>) -> rusqlite::Result<License> {
    Ok(License {
        license_id: parse_column(row, 0)?,
        key: parse_column(row, 1)?,
        tenant_id: parse_column(row, 2)?,
        plan_type: parse_column(row, 3)?,
        machine_hash: parse_optional_column(row, 4)?,
        status: parse_column(row, 5)?,
        valid_from: row.get(6)?,
        valid_until: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}
