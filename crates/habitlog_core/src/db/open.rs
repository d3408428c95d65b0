//! Connection setup for the habit store.
//!
//! # Invariants
//! - Every returned connection enforces foreign keys, so deleting a habit
//!   cascades to its records and score snapshots.
//! - Every returned connection is at `migrations::latest_version()`.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) the database file at `path`.
///
/// Logs one `db_open` event with the number of schema steps applied.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    prepare("file", Connection::open(path))
}

/// Opens a private in-memory database, mostly for tests.
pub fn open_db_in_memory() -> DbResult<Connection> {
    prepare("memory", Connection::open_in_memory())
}

fn prepare(mode: &'static str, opened: rusqlite::Result<Connection>) -> DbResult<Connection> {
    let started_at = Instant::now();
    let outcome = opened
        .map_err(DbError::from)
        .and_then(|mut conn| -> DbResult<(Connection, usize)> {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            conn.busy_timeout(BUSY_TIMEOUT)?;
            let migrated = apply_migrations(&mut conn)?;
            Ok((conn, migrated))
        });

    match outcome {
        Ok((conn, migrated)) => {
            info!(
                "event=db_open module=db status=ok mode={mode} migrated={migrated} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}
