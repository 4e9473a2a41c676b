//! Shared SQLite connection handles.
//!
//! A file database gets one writer connection and a small pool of
//! read-only connections. The file runs in WAL mode, so readers see the
//! last committed state and neither wait on the writer nor on each other.
//! An in-memory database cannot be shared between connections and serves
//! reads from its single connection.

use crate::error::{StorageError, StorageResult};
use crate::schema::SCHEMA;
use rusqlite::{Connection, OpenFlags, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::time::Duration;
use tracing::debug;

/// How long a statement waits on a locked database file before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Read-only connections opened next to the writer of a file database.
pub const READER_CONNECTIONS: usize = 4;

/// A cloneable handle to the tenantlock database.
///
/// All clones share the same connections. Every access holds a lock for a
/// single statement or one short transaction, never across calls.
#[derive(Clone)]
pub struct Database {
    writer: Arc<Mutex<Connection>>,
    readers: Arc<[Mutex<Connection>]>,
    next_reader: Arc<AtomicUsize>,
}

impl Database {
    /// Opens (or creates) a database file at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let writer = Connection::open(path)?;
        writer.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        let writer = prepare(writer)?;

        let readers = (0..READER_CONNECTIONS)
            .map(|_| open_reader(path))
            .collect::<StorageResult<Vec<_>>>()?;

        debug!(
            "Opened database at {} with {} readers",
            path.display(),
            readers.len()
        );
        Ok(Self::from_parts(writer, readers))
    }

    /// Opens an in-memory database (for testing and ephemeral runs).
    pub fn open_in_memory() -> StorageResult<Self> {
        let writer = prepare(Connection::open_in_memory()?)?;
        Ok(Self::from_parts(writer, Vec::new()))
    }

    fn from_parts(writer: Connection, readers: Vec<Mutex<Connection>>) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
            readers: Arc::from(readers),
            next_reader: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Runs `f` against the writer connection.
    pub fn with_conn<R, E>(&self, f: impl FnOnce(&Connection) -> Result<R, E>) -> Result<R, E>
    where
        E: From<StorageError>,
    {
        let conn = self.writer.lock().map_err(|_| StorageError::Poisoned)?;
        f(&conn)
    }

    /// Runs a read-only `f` on a pooled reader.
    ///
    /// Picks the first idle reader; if all are busy, waits on one in
    /// rotation. Falls back to the writer for in-memory databases.
    pub fn with_read<R, E>(&self, f: impl FnOnce(&Connection) -> Result<R, E>) -> Result<R, E>
    where
        E: From<StorageError>,
    {
        if self.readers.is_empty() {
            return self.with_conn(f);
        }
        let conn = self.acquire_reader()?;
        f(&conn)
    }

    /// Runs `f` inside an immediate transaction on the writer, committing
    /// if it returns `Ok`.
    ///
    /// The write lock is taken up front so a read-then-write inside `f`
    /// cannot interleave with another writer.
    pub fn with_tx<R, E>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<R, E>) -> Result<R, E>
    where
        E: From<StorageError>,
    {
        let mut conn = self.writer.lock().map_err(|_| StorageError::Poisoned)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StorageError::from)?;
        let out = f(&tx)?;
        tx.commit().map_err(StorageError::from)?;
        Ok(out)
    }

    fn acquire_reader(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        let start = self.next_reader.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        for offset in 0..self.readers.len() {
            let slot = &self.readers[(start + offset) % self.readers.len()];
            match slot.try_lock() {
                Ok(conn) => return Ok(conn),
                Err(TryLockError::WouldBlock) => continue,
                Err(TryLockError::Poisoned(_)) => return Err(StorageError::Poisoned),
            }
        }
        self.readers[start]
            .lock()
            .map_err(|_| StorageError::Poisoned)
    }
}

fn prepare(conn: Connection) -> StorageResult<Connection> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}

fn open_reader(path: &Path) -> StorageResult<Mutex<Connection>> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(Mutex::new(conn))
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("readers", &self.readers.len())
            .finish_non_exhaustive()
    }
}
