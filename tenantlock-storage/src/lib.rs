//! SQLite storage layer for tenantlock.
//!
//! Provides the shared [`Database`] handle, the schema for tenants,
//! licenses, and platform configuration, and the read-only
//! [`TenantDirectory`] view the rest of the workspace uses to look up
//! tenants.
//!
//! # Concurrency
//!
//! Writes go through one connection behind a mutex; reads of a file
//! database use a pool of read-only WAL connections and never queue
//! behind a writer. Conditional writes (`UPDATE ... WHERE column IS
//! NULL`) and UNIQUE constraints provide the atomic check-and-set
//! guarantees; the mutex only serializes access to the writer itself.

mod database;
mod error;
mod row;
mod schema;
mod tenants;

pub use database::{Database, READER_CONNECTIONS};
pub use error::{is_unique_violation, StorageError, StorageResult};
pub use row::{parse_column, parse_optional_column};
pub use tenants::{TenantDirectory, TenantTable};
