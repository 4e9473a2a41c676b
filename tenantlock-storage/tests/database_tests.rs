use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};
use tenantlock_storage::{is_unique_violation, Database, StorageError, READER_CONNECTIONS};

#[test]
fn schema_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.sqlite");
    Database::open(&path).unwrap();
    Database::open(&path).unwrap();
}

#[test]
fn with_tx_rolls_back_on_error() {
    let db = Database::open_in_memory().unwrap();
    let result: Result<(), StorageError> = db.with_tx(|tx| {
        tx.execute(
            "INSERT INTO platform_config (key, value, created_at, updated_at)
             VALUES ('K', 'V', '2024-01-01', '2024-01-01')",
            [],
        )?;
        Err(StorageError::InvalidData("abort".into()))
    });
    assert!(result.is_err());

    let count: i64 = db
        .with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM platform_config", [], |r| r.get(0))
                .map_err(StorageError::from)
        })
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn unique_violation_is_detected() {
    let db = Database::open_in_memory().unwrap();
    let insert = "INSERT INTO licenses (license_id, key, tenant_id, plan_type, valid_from, valid_until, created_at, updated_at)
                  VALUES (?1, 'SAME-KEY', 't', 'basic', 'a', 'b', 'c', 'd')";
    db.with_conn(|conn| conn.execute(insert, ["one"]).map_err(StorageError::from))
        .unwrap();
    let err = db
        .with_conn(|conn| conn.execute(insert, ["two"]).map_err(StorageError::from))
        .unwrap_err();
    assert!(err.is_unique_violation());
    if let StorageError::Database(inner) = &err {
        assert!(is_unique_violation(inner));
    }
}

#[test]
fn error_display() {
    assert!(StorageError::Poisoned.to_string().contains("poisoned"));
    assert!(StorageError::Conflict("dup".into()).to_string().contains("conflict: dup"));
    assert!(!StorageError::InvalidData("x".into()).is_unique_violation());
}

fn count_config(conn: &rusqlite::Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM platform_config", [], |r| r.get(0))
        .map_err(StorageError::from)
}

#[test]
fn file_reads_do_not_wait_for_the_writer() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(&dir.path().join("db.sqlite")).unwrap();
    let barrier = Arc::new(Barrier::new(2));

    let holder = {
        let db = db.clone();
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            db.with_conn(|_conn| {
                barrier.wait();
                thread::sleep(Duration::from_millis(500));
                Ok::<_, StorageError>(())
            })
            .unwrap();
        })
    };

    barrier.wait();
    let started = Instant::now();
    assert_eq!(db.with_read(count_config).unwrap(), 0);
    assert!(
        started.elapsed() < Duration::from_millis(250),
        "read waited {:?}",
        started.elapsed()
    );
    holder.join().unwrap();
}

#[test]
fn concurrent_reads_use_separate_connections() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(&dir.path().join("db.sqlite")).unwrap();
    let barrier = Arc::new(Barrier::new(READER_CONNECTIONS));

    let holders: Vec<_> = (0..READER_CONNECTIONS - 1)
        .map(|_| {
            let db = db.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                db.with_read(|conn| {
                    barrier.wait();
                    thread::sleep(Duration::from_millis(500));
                    count_config(conn)
                })
                .unwrap();
            })
        })
        .collect();

    barrier.wait();
    let started = Instant::now();
    db.with_read(count_config).unwrap();
    assert!(started.elapsed() < Duration::from_millis(250));
    for holder in holders {
        holder.join().unwrap();
    }
}

#[test]
fn readers_see_committed_writes() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(&dir.path().join("db.sqlite")).unwrap();
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO platform_config (key, value, created_at, updated_at)
             VALUES ('K', 'V', '2024-01-01', '2024-01-01')",
            [],
        )
        .map_err(StorageError::from)
    })
    .unwrap();

    for _ in 0..READER_CONNECTIONS {
        assert_eq!(db.with_read(count_config).unwrap(), 1);
    }
}

#[test]
fn readers_cannot_write() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(&dir.path().join("db.sqlite")).unwrap();
    let result = db.with_read(|conn| {
        conn.execute("DELETE FROM platform_config", [])
            .map_err(StorageError::from)
    });
    assert!(result.is_err());
}
