//! C3 — ContentTree. Owns `Document` rows grouped by `version_tree_id`.
//! No external mutators are exposed; only `path_tree` calls into this
//! module (spec §4.2: "Exposes no external mutators; only PathTree
//! mutates it").

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::errors::{CoreError, Result};
use crate::models::document::DocumentMetadata;
use crate::models::{Document, NewDocument};
use crate::schema::document;
use crate::schema::document_path;

/// Scans every `DocumentPath` in `corpus` (current or historical) for a
/// document whose `pdf_file_hash == hash`, returning the first match.
/// Lets content re-enter an active line after deletion without minting a
/// new `Document` row (spec §9 open question 1 — kept as specified).
pub fn find_in_corpus_by_hash(conn: &mut SqliteConnection, corpus: &str, hash: &str) -> Result<Option<Document>> {
    let found: Option<Document> = document::table
        .inner_join(document_path::table.on(document_path::document.eq(document::id)))
        .filter(document_path::corpus.eq(corpus))
        .filter(document::pdf_file_hash.eq(hash))
        .select(Document::as_select())
        .first(conn)
        .optional()?;
    Ok(found)
}

/// Scans globally for `hash`, used only to inherit provenance
/// (`source_document`) and shared parsing artifacts for content entering
/// a new corpus for the first time.
pub fn find_global_by_hash(conn: &mut SqliteConnection, hash: &str) -> Result<Option<Document>> {
    let found = document::table
        .filter(document::pdf_file_hash.eq(hash))
        .order(document::created.asc())
        .select(Document::as_select())
        .first(conn)
        .optional()?;
    Ok(found)
}

pub fn find_by_id(conn: &mut SqliteConnection, id: &str) -> Result<Document> {
    document::table
        .filter(document::id.eq(id))
        .select(Document::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| CoreError::NotFound(format!("document {id}")))
}

/// Flips `is_current=false` on every row sharing `old.version_tree_id`,
/// inserts a new row with `parent = old`, same `version_tree_id`,
/// inheriting `structural_annotation_set` (C2). Caller must already hold
/// the lock on the affected `(corpus, path)` line.
pub fn new_version(
    conn: &mut SqliteConnection,
    old: &Document,
    hash: &str,
    blob_handle: String,
    creator: &str,
    metadata: &DocumentMetadata,
) -> Result<Document> {
    diesel::update(document::table.filter(document::version_tree_id.eq(&old.version_tree_id)))
        .set(document::is_current.eq(false))
        .execute(conn)?;

    let new_row = NewDocument::version_of(old, hash, blob_handle, creator, metadata);
    diesel::insert_into(document::table).values(&new_row).execute(conn)?;
    find_by_id(conn, &new_row.id)
}

/// Inserts a new root document with a fresh `version_tree_id`.
#[allow(clippy::too_many_arguments)]
pub fn new_isolated(
    conn: &mut SqliteConnection,
    hash: &str,
    blob_handle: String,
    creator: &str,
    metadata: &DocumentMetadata,
    source_document: Option<String>,
    structural_annotation_set: Option<String>,
) -> Result<Document> {
    let new_row =
        NewDocument::isolated(hash, blob_handle, creator, metadata, source_document, structural_annotation_set);
    diesel::insert_into(document::table).values(&new_row).execute(conn)?;
    find_by_id(conn, &new_row.id)
}

/// Walks `parent` pointers upward from `leaf`, returning oldest-first
/// (spec §4.2 "Version history traversal").
pub fn content_history(conn: &mut SqliteConnection, leaf: &Document) -> Result<Vec<Document>> {
    let mut chain = vec![leaf.clone()];
    let mut cursor = leaf.parent.clone();
    while let Some(parent_id) = cursor {
        let parent = find_by_id(conn, &parent_id)?;
        cursor = parent.parent.clone();
        chain.push(parent);
    }
    chain.reverse();
    Ok(chain)
}

/// Number of content ancestors of `doc`, used by `path_tree::import` Case
/// B to set `version_number` for a path re-linked to existing content.
pub fn count_content_ancestors(conn: &mut SqliteConnection, doc: &Document) -> Result<i32> {
    Ok(content_history(conn, doc)?.len() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::test_conn;

    #[test]
    fn isolated_document_starts_its_own_tree() {
        let mut conn = test_conn();
        let meta = DocumentMetadata { title: Some("a".into()), ..Default::default() };
        let doc = new_isolated(&mut conn, "hash1", "blob1".into(), "alice", &meta, None, None).unwrap();
        assert!(doc.is_current);
        assert!(doc.parent.is_none());
        assert_eq!(doc.pdf_file_hash.as_deref(), Some("hash1"));
    }

    #[test]
    fn new_version_flips_previous_current() {
        let mut conn = test_conn();
        let meta = DocumentMetadata::default();
        let v1 = new_isolated(&mut conn, "hash1", "blob1".into(), "alice", &meta, None, None).unwrap();
        let v2 = new_version(&mut conn, &v1, "hash2", "blob2".into(), "alice", &meta).unwrap();

        let reloaded_v1 = find_by_id(&mut conn, &v1.id).unwrap();
        assert!(!reloaded_v1.is_current);
        assert!(v2.is_current);
        assert_eq!(v2.version_tree_id, v1.version_tree_id);
        assert_eq!(v2.parent.as_deref(), Some(v1.id.as_str()));

        let history = content_history(&mut conn, &v2).unwrap();
        assert_eq!(history.iter().map(|d| d.id.clone()).collect::<Vec<_>>(), vec![v1.id.clone(), v2.id.clone()]);
    }
}
