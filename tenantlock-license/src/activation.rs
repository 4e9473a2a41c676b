//! Node-locked activation and runtime validation.
//!
//! `activate` is the only call that binds a machine, and it is safe to
//! retry: repeating it with the same fingerprint after a successful bind
//! returns the same success without writing anything. `validate` never
//! writes, so routine checks cannot bind or rebind a device.
//!
//! Both check, in order: the key exists, the license is not revoked, the
//! current time is inside the validity window, and only then the binding.

use crate::error::{LicenseError, LicenseResult};
use crate::key::LicenseKey;
use crate::license::License;
use crate::store::{BindResult, LicenseStore};
use chrono::{DateTime, Utc};
use tenantlock_types::MachineHash;
use tracing::{debug, info};

/// Successful activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    /// The license as stored after activation.
    pub license: License,
    /// True if this call performed the binding, false for a repeat.
    pub first_bind: bool,
}

/// Activation and validation protocol over a [`LicenseStore`].
#[derive(Debug, Clone)]
pub struct ActivationEngine {
    store: LicenseStore,
}

impl ActivationEngine {
    #[must_use]
    pub fn new(store: LicenseStore) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &LicenseStore {
        &self.store
    }

    /// Activates a license on a machine, evaluated at the current time.
    pub fn activate(&self, key: &LicenseKey, machine_hash: &MachineHash) -> LicenseResult<Activation> {
        self.activate_at(key, machine_hash, Utc::now())
    }

    /// Activates a license on a machine, evaluated at `now`.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Revoked`, `NotYetValid`, `Expired`, or `AlreadyBound`
    /// if the license is bound to a different machine.
    pub fn activate_at(
        &self,
        key: &LicenseKey,
        machine_hash: &MachineHash,
        now: DateTime<Utc>,
    ) -> LicenseResult<Activation> {
        let license = self.store.find_by_key(key)?;
        license.check_usable_at(now)?;

        match &license.machine_hash {
            Some(bound) if bound == machine_hash => {
                debug!("License {} re-activated on its bound machine", license.license_id);
                return Ok(Activation {
                    license,
                    first_bind: false,
                });
            }
            Some(_) => return Err(LicenseError::AlreadyBound),
            None => {}
        }

        match self.store.bind_machine(&license.license_id, machine_hash)? {
            BindResult::Bound(license) => {
                info!("License {} activated", license.license_id);
                Ok(Activation {
                    license,
                    first_bind: true,
                })
            }
            BindResult::AlreadyBoundToSame(license) => Ok(Activation {
                license,
                first_bind: false,
            }),
            BindResult::BoundToOther(_) => Err(LicenseError::AlreadyBound),
        }
    }

    /// Validates a license for a machine, evaluated at the current time.
    pub fn validate(&self, key: &LicenseKey, machine_hash: &MachineHash) -> LicenseResult<License> {
        self.validate_at(key, machine_hash, Utc::now())
    }

    /// Validates a license for a machine, evaluated at `now`. Never writes.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Revoked`, `NotYetValid`, `Expired`, `NotActivated` if
    /// the license was never activated, or `MachineMismatch`.
    pub fn validate_at(
        &self,
        key: &LicenseKey,
        machine_hash: &MachineHash,
        now: DateTime<Utc>,
    ) -> LicenseResult<License> {
        let license = self.store.find_by_key(key)?;
        license.check_usable_at(now)?;

        match &license.machine_hash {
            None => Err(LicenseError::NotActivated),
            Some(bound) if bound == machine_hash => Ok(license),
            Some(_) => Err(LicenseError::MachineMismatch),
        }
    }
}
