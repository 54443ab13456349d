use corpus_engine::models::corpus::NewCorpus;
use corpus_engine::schema::corpus;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

/// A throwaway on-disk SQLite database with every migration applied,
/// following `tests/migration_parity.rs`'s pattern (in the teacher repo)
/// of exercising migrations against a real file rather than a mock.
/// Seeded with the two corpus ids every scenario/invariant test imports
/// into ("c1", "c2") so `document_path.corpus`'s foreign key resolves.
pub fn test_conn() -> SqliteConnection {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("scenario.sqlite3");
    std::mem::forget(dir);

    let mut conn = SqliteConnection::establish(path.to_str().unwrap()).expect("open sqlite");
    conn.batch_execute("PRAGMA foreign_keys = ON;").expect("pragma");
    corpus_engine::migrations::run_all(&mut conn).expect("run migrations");
    seed_corpus(&mut conn, "c1");
    seed_corpus(&mut conn, "c2");
    conn
}

fn seed_corpus(conn: &mut SqliteConnection, id: &str) {
    let mut row = NewCorpus::new(id, "seed", false);
    row.id = id.to_string();
    diesel::insert_into(corpus::table).values(&row).execute(conn).expect("seed corpus");
}
