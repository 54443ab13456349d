//! Pool setup, migration running, and retry helpers. Grounded in the
//! teacher's `repository/mod.rs` (`connect`, `with_retry`) and
//! `repository/pool.rs` (`DbPool`), trimmed to the single synchronous
//! SQLite backend this engine picks per SPEC_FULL.md §5 — no postgres
//! variant, no async wrapper.

pub mod content_tree;
pub mod corpus;
pub mod corpus_folder;
pub mod path_tree;
pub mod predicate;
pub mod query_plane;
pub mod structural_set_store;

#[cfg(test)]
pub mod test_support;

use std::thread;
use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;

use crate::errors::{CoreError, Result};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Opens a pooled connection to `database_url`, applying the same pragma
/// set the teacher's `connect()` uses for a single-writer SQLite database
/// under concurrent readers: WAL journaling, a generous busy timeout, and
/// foreign keys on (SQLite defaults them off).
pub fn build_pool(database_url: &str) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder().build(manager)?;
    {
        let mut conn = pool.get()?;
        apply_pragmas(&mut conn)?;
    }
    Ok(pool)
}

fn apply_pragmas(conn: &mut SqliteConnection) -> Result<()> {
    conn.batch_execute(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 30000;",
    )?;
    Ok(())
}

/// Runs every migration in `migrations::registry()`, in dependency order.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<()> {
    crate::migrations::run_all(conn)
}

/// Retries `f` on transient SQLite contention (`database is locked` /
/// `SQLITE_BUSY`), matching the teacher's `with_retry` backoff schedule:
/// five attempts, doubling from 100ms.
pub fn with_retry<T, F>(mut f: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut delay = Duration::from_millis(100);
    let mut attempt = 0;
    loop {
        match f() {
            Ok(value) => return Ok(value),
            Err(err) if attempt < 4 && is_locked_error(&err) => {
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "retrying after lock contention");
                thread::sleep(delay);
                delay *= 2;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

fn is_locked_error(err: &CoreError) -> bool {
    match err {
        CoreError::Transient(_) => true,
        CoreError::Repository(diesel::result::Error::DatabaseError(_, info)) => {
            let message = info.message();
            message.contains("database is locked") || message.contains("SQLITE_BUSY") || message.contains("SQLITE_LOCKED")
        }
        _ => false,
    }
}

/// Runs `body` inside a `BEGIN IMMEDIATE` transaction, acquiring the
/// write lock up front instead of on first write (SQLite's default
/// `BEGIN DEFERRED` would otherwise let two transactions both start as
/// readers and deadlock on upgrade). See SPEC_FULL.md §5.
pub fn with_immediate_transaction<T, F>(conn: &mut SqliteConnection, body: F) -> Result<T>
where
    F: FnOnce(&mut SqliteConnection) -> Result<T>,
{
    conn.batch_execute("BEGIN IMMEDIATE")?;
    match body(conn) {
        Ok(value) => {
            conn.batch_execute("COMMIT")?;
            Ok(value)
        }
        Err(err) => {
            let _ = conn.batch_execute("ROLLBACK");
            Err(err)
        }
    }
}
