//! `CorpusFolder` CRUD. Folders are "freely mutable" (spec §3); the one
//! specified side effect is on deletion: affected `DocumentPath.folder`
//! values are nulled, `path` strings are left untouched (P6, spec §9
//! open question 2 — implemented as specified, no renormalization).

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::errors::{CoreError, Result};
use crate::models::corpus::NewCorpusFolder;
use crate::models::CorpusFolder;
use crate::schema::{corpus_folder, document_path};

pub fn create(
    conn: &mut SqliteConnection,
    corpus: &str,
    parent: Option<String>,
    name: &str,
    creator: &str,
) -> Result<CorpusFolder> {
    let new_row = NewCorpusFolder::new(corpus, parent, name, creator);
    diesel::insert_into(corpus_folder::table).values(&new_row).execute(conn)?;
    find_by_id(conn, &new_row.id)
}

pub fn find_by_id(conn: &mut SqliteConnection, id: &str) -> Result<CorpusFolder> {
    corpus_folder::table
        .filter(corpus_folder::id.eq(id))
        .select(CorpusFolder::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| CoreError::NotFound(format!("corpus folder {id}")))
}

pub fn rename(conn: &mut SqliteConnection, id: &str, name: &str) -> Result<()> {
    diesel::update(corpus_folder::table.filter(corpus_folder::id.eq(id)))
        .set(corpus_folder::name.eq(name))
        .execute(conn)?;
    Ok(())
}

/// Deletes the folder row and nulls `folder` on every `DocumentPath` that
/// pointed at it. Paths remain active; `version_number` is untouched —
/// this is not a PathTree lifecycle event, just a foreign-key cleanup.
pub fn delete(conn: &mut SqliteConnection, id: &str) -> Result<()> {
    diesel::update(document_path::table.filter(document_path::folder.eq(id)))
        .set(document_path::folder.eq(None::<String>))
        .execute(conn)?;
    diesel::delete(corpus_folder::table.filter(corpus_folder::id.eq(id))).execute(conn)?;
    tracing::info!(folder = id, "deleted corpus folder");
    Ok(())
}
