//! `Corpus` CRUD. Corpuses are not versioned by this core (spec §3); this
//! module exists only so `document_path.corpus`'s foreign key has
//! something to reference and the CLI/tests have one canonical way to
//! create one.

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::errors::{CoreError, Result};
use crate::models::corpus::NewCorpus;
use crate::models::Corpus;
use crate::schema::corpus;

pub fn create(conn: &mut SqliteConnection, title: &str, creator: &str, is_public: bool) -> Result<Corpus> {
    let new_row = NewCorpus::new(title, creator, is_public);
    diesel::insert_into(corpus::table).values(&new_row).execute(conn)?;
    find_by_id(conn, &new_row.id)
}

pub fn find_by_id(conn: &mut SqliteConnection, id: &str) -> Result<Corpus> {
    corpus::table
        .filter(corpus::id.eq(id))
        .select(Corpus::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| CoreError::NotFound(format!("corpus {id}")))
}
