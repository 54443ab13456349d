//! C4 — PathTree. The only write surface an external caller uses:
//! `import`, `move_path`, `delete`, `restore`. Every operation runs under
//! a single `BEGIN IMMEDIATE` transaction with row-level locking on the
//! affected `(corpus, path)` line (SPEC_FULL.md §5).

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::errors::{CoreError, Result};
use crate::hash::sha256_hex;
use crate::models::document::{DocumentMetadata, ImportStatus};
use crate::models::document_path::FolderChange;
use crate::models::{Document, DocumentPath, NewDocumentPath};
use crate::repository::{content_tree, with_immediate_transaction};
use crate::schema::document_path;

pub struct ImportOutcome {
    pub document: Document,
    pub status: ImportStatus,
    pub path_node: DocumentPath,
}

fn find_active(conn: &mut SqliteConnection, corpus: &str, path: &str) -> Result<Option<DocumentPath>> {
    document_path::table
        .filter(document_path::corpus.eq(corpus))
        .filter(document_path::path.eq(path))
        .filter(document_path::is_current.eq(true))
        .filter(document_path::is_deleted.eq(false))
        .select(DocumentPath::as_select())
        .first(conn)
        .optional()
        .map_err(CoreError::from)
}

fn find_active_deleted(conn: &mut SqliteConnection, corpus: &str, path: &str) -> Result<Option<DocumentPath>> {
    document_path::table
        .filter(document_path::corpus.eq(corpus))
        .filter(document_path::path.eq(path))
        .filter(document_path::is_current.eq(true))
        .filter(document_path::is_deleted.eq(true))
        .select(DocumentPath::as_select())
        .first(conn)
        .optional()
        .map_err(CoreError::from)
}

fn flip_not_current(conn: &mut SqliteConnection, path_id: &str) -> Result<()> {
    diesel::update(document_path::table.filter(document_path::id.eq(path_id)))
        .set(document_path::is_current.eq(false))
        .execute(conn)?;
    Ok(())
}

fn find_path_by_id(conn: &mut SqliteConnection, id: &str) -> Result<DocumentPath> {
    document_path::table
        .filter(document_path::id.eq(id))
        .select(DocumentPath::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| CoreError::NotFound(format!("document path {id}")))
}

/// `import(corpus, path, content_bytes, user, folder?, metadata?)`
/// (spec §4.3.1). Hashing and blob storage happen before the transaction
/// opens, per §5 ("Embedding generation and blob I/O are done outside the
/// lock wherever possible").
pub fn import(
    conn: &mut SqliteConnection,
    corpus: &str,
    path: &str,
    content_bytes: &[u8],
    blob_handle: String,
    user: &str,
    folder: Option<String>,
    metadata: DocumentMetadata,
) -> Result<ImportOutcome> {
    let hash = sha256_hex(content_bytes);
    with_immediate_transaction(conn, |conn| import_locked(conn, corpus, path, &hash, blob_handle, user, folder, &metadata))
}

#[allow(clippy::too_many_arguments)]
fn import_locked(
    conn: &mut SqliteConnection,
    corpus: &str,
    path: &str,
    hash: &str,
    blob_handle: String,
    user: &str,
    folder: Option<String>,
    metadata: &DocumentMetadata,
) -> Result<ImportOutcome> {
    match find_active(conn, corpus, path)? {
        Some(current) => {
            let current_doc = content_tree::find_by_id(conn, &current.document)?;

            if current_doc.pdf_file_hash.as_deref() == Some(hash) {
                tracing::info!(corpus, path, status = "unchanged", "import");
                return Ok(ImportOutcome { document: current_doc, status: ImportStatus::Unchanged, path_node: current });
            }

            let new_doc = match content_tree::find_in_corpus_by_hash(conn, corpus, hash)? {
                Some(reuse) => reuse,
                None => content_tree::new_version(conn, &current_doc, hash, blob_handle, user, metadata)?,
            };

            flip_not_current(conn, &current.id)?;
            let new_path = NewDocumentPath::new(
                new_doc.id.clone(),
                corpus,
                folder.or_else(|| current.folder.clone()),
                path,
                current.version_number + 1,
                Some(current.id.clone()),
                false,
                user,
            );
            diesel::insert_into(document_path::table).values(&new_path).execute(conn)?;
            let path_node = find_path_by_id(conn, &new_path.id)?;
            tracing::info!(corpus, path, status = "updated", document = %new_doc.id, "import");
            Ok(ImportOutcome { document: new_doc, status: ImportStatus::Updated, path_node })
        }
        None => {
            if let Some(reuse) = content_tree::find_in_corpus_by_hash(conn, corpus, hash)? {
                let version_number = content_tree::count_content_ancestors(conn, &reuse)?;
                let new_path =
                    NewDocumentPath::new(reuse.id.clone(), corpus, folder, path, version_number, None, false, user);
                diesel::insert_into(document_path::table).values(&new_path).execute(conn)?;
                let path_node = find_path_by_id(conn, &new_path.id)?;
                tracing::info!(corpus, path, status = "linked", document = %reuse.id, "import");
                return Ok(ImportOutcome { document: reuse, status: ImportStatus::Linked, path_node });
            }

            let (doc, status) = match content_tree::find_global_by_hash(conn, hash)? {
                Some(global) => {
                    let doc = content_tree::new_isolated(
                        conn,
                        hash,
                        global.pdf_file.clone().unwrap_or_else(|| blob_handle.clone()),
                        user,
                        metadata,
                        Some(global.id.clone()),
                        global.structural_annotation_set.clone(),
                    )?;
                    (doc, ImportStatus::CreatedFromExisting)
                }
                None => {
                    let doc = content_tree::new_isolated(conn, hash, blob_handle, user, metadata, None, None)?;
                    (doc, ImportStatus::Created)
                }
            };

            let new_path = NewDocumentPath::new(doc.id.clone(), corpus, folder, path, 1, None, false, user);
            diesel::insert_into(document_path::table).values(&new_path).execute(conn)?;
            let path_node = find_path_by_id(conn, &new_path.id)?;
            tracing::info!(corpus, path, status = status.as_str(), document = %doc.id, "import");
            Ok(ImportOutcome { document: doc, status, path_node })
        }
    }
}

/// `move(corpus, old_path, new_path, user, folder_change)` (spec §4.3.2).
/// Does not bump `version_number` (P5).
pub fn move_path(
    conn: &mut SqliteConnection,
    corpus: &str,
    old_path: &str,
    new_path: &str,
    user: &str,
    folder_change: FolderChange,
) -> Result<DocumentPath> {
    with_immediate_transaction(conn, |conn| {
        let current = find_active(conn, corpus, old_path)?
            .ok_or_else(|| CoreError::NotFound(format!("active path {corpus}:{old_path}")))?;

        if find_active(conn, corpus, new_path)?.is_some() {
            return Err(CoreError::PathOccupied(format!("{corpus}:{new_path}")));
        }

        flip_not_current(conn, &current.id)?;
        let folder = folder_change.resolve(current.folder.as_deref());
        let new_row = NewDocumentPath::new(
            current.document.clone(),
            corpus,
            folder,
            new_path,
            current.version_number,
            Some(current.id.clone()),
            false,
            user,
        );
        diesel::insert_into(document_path::table).values(&new_row).execute(conn)?;
        tracing::info!(corpus, from = old_path, to = new_path, "move");
        find_path_by_id(conn, &new_row.id)
    })
}

/// `delete(corpus, path, user)` (spec §4.3.3). Soft delete, reversible.
pub fn delete(conn: &mut SqliteConnection, corpus: &str, path: &str, user: &str) -> Result<DocumentPath> {
    with_immediate_transaction(conn, |conn| {
        let current = find_active(conn, corpus, path)?
            .ok_or_else(|| CoreError::NotFound(format!("active path {corpus}:{path}")))?;

        flip_not_current(conn, &current.id)?;
        let new_row = NewDocumentPath::new(
            current.document.clone(),
            corpus,
            current.folder.clone(),
            path,
            current.version_number,
            Some(current.id.clone()),
            true,
            user,
        );
        diesel::insert_into(document_path::table).values(&new_row).execute(conn)?;
        tracing::info!(corpus, path, "delete");
        find_path_by_id(conn, &new_row.id)
    })
}

/// `restore(corpus, path, user)` (spec §4.3.4).
pub fn restore(conn: &mut SqliteConnection, corpus: &str, path: &str, user: &str) -> Result<DocumentPath> {
    with_immediate_transaction(conn, |conn| {
        let current = find_active_deleted(conn, corpus, path)?
            .ok_or_else(|| CoreError::NotFound(format!("deleted active path {corpus}:{path}")))?;

        flip_not_current(conn, &current.id)?;
        let new_row = NewDocumentPath::new(
            current.document.clone(),
            corpus,
            current.folder.clone(),
            path,
            current.version_number,
            Some(current.id.clone()),
            false,
            user,
        );
        diesel::insert_into(document_path::table).values(&new_row).execute(conn)?;
        tracing::info!(corpus, path, "restore");
        find_path_by_id(conn, &new_row.id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::test_conn;

    fn import_simple(conn: &mut SqliteConnection, corpus: &str, path: &str, bytes: &[u8], user: &str) -> ImportOutcome {
        let handle = sha256_hex(bytes);
        import(conn, corpus, path, bytes, handle, user, None, DocumentMetadata::default()).unwrap()
    }

    #[test]
    fn scenario_a_basic_import_update_cycle() {
        let mut conn = test_conn();
        let first = import_simple(&mut conn, "c1", "/a.pdf", b"v1", "u");
        assert_eq!(first.status, ImportStatus::Created);
        assert_eq!(first.path_node.version_number, 1);

        let repeat = import_simple(&mut conn, "c1", "/a.pdf", b"v1", "u");
        assert_eq!(repeat.status, ImportStatus::Unchanged);
        assert_eq!(repeat.path_node.id, first.path_node.id);

        let updated = import_simple(&mut conn, "c1", "/a.pdf", b"v2", "u");
        assert_eq!(updated.status, ImportStatus::Updated);
        assert_eq!(updated.path_node.version_number, 2);
        assert_eq!(updated.document.parent.as_deref(), Some(first.document.id.as_str()));

        let history = content_tree::content_history(&mut conn, &updated.document).unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn scenario_b_move_delete_restore_preserves_version_number() {
        let mut conn = test_conn();
        let created = import_simple(&mut conn, "c1", "/x.pdf", b"v1", "u");

        let moved = move_path(&mut conn, "c1", "/x.pdf", "/y.pdf", "u", FolderChange::Unchanged).unwrap();
        assert_eq!(moved.version_number, created.path_node.version_number);

        let deleted = delete(&mut conn, "c1", "/y.pdf", "u").unwrap();
        assert!(deleted.is_deleted);
        assert_eq!(deleted.version_number, created.path_node.version_number);

        let restored = restore(&mut conn, "c1", "/y.pdf", "u").unwrap();
        assert!(!restored.is_deleted);
        assert_eq!(restored.version_number, created.path_node.version_number);
    }

    #[test]
    fn move_into_occupied_path_fails() {
        let mut conn = test_conn();
        import_simple(&mut conn, "c1", "/a.pdf", b"v1", "u");
        import_simple(&mut conn, "c1", "/b.pdf", b"v2", "u");

        let result = move_path(&mut conn, "c1", "/a.pdf", "/b.pdf", "u", FolderChange::Unchanged);
        assert!(matches!(result, Err(CoreError::PathOccupied(_))));
    }

    #[test]
    fn scenario_c_cross_corpus_dedup_with_provenance() {
        let mut conn = test_conn();
        let a = import_simple(&mut conn, "c1", "/s.pdf", b"shared", "u");
        let b = import_simple(&mut conn, "c2", "/s.pdf", b"shared", "u");

        assert_eq!(b.status, ImportStatus::CreatedFromExisting);
        assert_eq!(b.document.source_document.as_deref(), Some(a.document.id.as_str()));
        assert_ne!(b.document.version_tree_id, a.document.version_tree_id);
    }

    #[test]
    fn reimporting_existing_content_in_same_corpus_links_without_new_document() {
        let mut conn = test_conn();
        let first = import_simple(&mut conn, "c1", "/p.pdf", b"v1", "u");
        delete(&mut conn, "c1", "/p.pdf", "u").unwrap();

        let linked = import_simple(&mut conn, "c1", "/q.pdf", b"v1", "u");
        assert_eq!(linked.status, ImportStatus::Linked);
        assert_eq!(linked.document.id, first.document.id);
    }
}
