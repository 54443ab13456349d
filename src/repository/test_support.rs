//! Test-only connection helper: an on-disk temp SQLite file with every
//! migration applied, mirroring `tests/migration_parity.rs`'s pattern of
//! exercising the migration registry against a real file rather than a
//! mock.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::models::corpus::NewCorpus;
use crate::schema::corpus;

/// Seeded with corpus ids "c1"/"c2", the only ones this crate's unit
/// tests import into; `document_path.corpus`/`annotation.corpus` both
/// carry a foreign key to `corpus(id)`.
pub fn test_conn() -> SqliteConnection {
    // Each call gets its own private temp file; `file::memory:` with
    // `cache=shared` would work too but a real file better matches how
    // the engine is actually deployed.
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("test.sqlite3");
    // Leak the tempdir so it outlives the connection for the test's
    // duration; tests are short-lived processes.
    std::mem::forget(dir);

    let mut conn = SqliteConnection::establish(path.to_str().unwrap()).expect("open sqlite");
    conn.batch_execute("PRAGMA foreign_keys = ON;").expect("pragma");
    crate::migrations::run_all(&mut conn).expect("run migrations");
    seed_corpus(&mut conn, "c1");
    seed_corpus(&mut conn, "c2");
    conn
}

fn seed_corpus(conn: &mut SqliteConnection, id: &str) {
    let mut row = NewCorpus::new(id, "seed", false);
    row.id = id.to_string();
    diesel::insert_into(corpus::table).values(&row).execute(conn).expect("seed corpus");
}
