//! C2 — StructuralSetStore.

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::errors::{CoreError, Result};
use crate::models::structural_set::StructuralSetDefaults;
use crate::models::{Document, NewStructuralAnnotationSet, StructuralAnnotationSet};
use crate::schema::{annotation, document, relationship, structural_annotation_set};

/// `get_or_create(content_hash, defaults)`. Unique on `content_hash`.
pub fn get_or_create(
    conn: &mut SqliteConnection,
    content_hash: &str,
    creator: &str,
    defaults: &StructuralSetDefaults,
) -> Result<(StructuralAnnotationSet, bool)> {
    if let Some(existing) = find_by_hash(conn, content_hash)? {
        return Ok((existing, false));
    }

    let new_row = NewStructuralAnnotationSet::new(content_hash, creator, defaults);
    diesel::insert_into(structural_annotation_set::table).values(&new_row).execute(conn)?;
    let created = find_by_hash(conn, content_hash)?
        .ok_or_else(|| CoreError::Integrity("structural set missing after insert".to_string()))?;
    Ok((created, true))
}

pub fn find_by_hash(conn: &mut SqliteConnection, content_hash: &str) -> Result<Option<StructuralAnnotationSet>> {
    structural_annotation_set::table
        .filter(structural_annotation_set::content_hash.eq(content_hash))
        .select(StructuralAnnotationSet::as_select())
        .first(conn)
        .optional()
        .map_err(CoreError::from)
}

pub fn find_by_id(conn: &mut SqliteConnection, id: &str) -> Result<StructuralAnnotationSet> {
    structural_annotation_set::table
        .filter(structural_annotation_set::id.eq(id))
        .select(StructuralAnnotationSet::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| CoreError::NotFound(format!("structural annotation set {id}")))
}

/// `attach_to_document(document, set)`.
pub fn attach_to_document(conn: &mut SqliteConnection, document_id: &str, set_id: &str) -> Result<()> {
    diesel::update(document::table.filter(document::id.eq(document_id)))
        .set(document::structural_annotation_set.eq(set_id))
        .execute(conn)?;
    Ok(())
}

/// One-time migration of a document's annotations/relationships into a
/// shared structural set. Idempotent: a document already linked is
/// skipped (spec §4.4).
pub fn migrate_document(
    conn: &mut SqliteConnection,
    doc: &Document,
    creator: &str,
    force_without_hash: bool,
) -> Result<()> {
    if doc.structural_annotation_set.is_some() {
        tracing::debug!(document = %doc.id, "document already linked to a structural set, skipping");
        return Ok(());
    }

    let content_hash = match (&doc.pdf_file_hash, force_without_hash) {
        (Some(hash), _) => hash.clone(),
        (None, true) => format!("doc-{}", doc.id),
        (None, false) => {
            return Err(CoreError::PreconditionFailed(format!(
                "document {} has no content hash and force flag not set",
                doc.id
            )))
        }
    };

    let (set, _created) = get_or_create(conn, &content_hash, creator, &StructuralSetDefaults::default())?;

    diesel::update(
        annotation::table.filter(annotation::document.eq(&doc.id)).filter(annotation::structural.eq(true)),
    )
    .set((annotation::structural_set.eq(&set.id), annotation::document.eq(None::<String>)))
    .execute(conn)?;

    diesel::update(
        relationship::table.filter(relationship::document.eq(&doc.id)).filter(relationship::structural.eq(true)),
    )
    .set((relationship::structural_set.eq(&set.id), relationship::document.eq(None::<String>)))
    .execute(conn)?;

    attach_to_document(conn, &doc.id, &set.id)
}

pub fn count_annotations(conn: &mut SqliteConnection, set_id: &str) -> Result<i64> {
    Ok(annotation::table.filter(annotation::structural_set.eq(set_id)).count().get_result(conn)?)
}

pub fn count_relationships(conn: &mut SqliteConnection, set_id: &str) -> Result<i64> {
    Ok(relationship::table.filter(relationship::structural_set.eq(set_id)).count().get_result(conn)?)
}

/// Refuses deletion while any `Document` references the set (PROTECT,
/// application-enforced since SQLite has no native `PROTECT` action).
pub fn delete_if_orphaned(conn: &mut SqliteConnection, set_id: &str) -> Result<bool> {
    let referenced: i64 = document::table
        .filter(document::structural_annotation_set.eq(set_id))
        .count()
        .get_result(conn)?;
    if referenced > 0 {
        return Ok(false);
    }
    diesel::delete(structural_annotation_set::table.filter(structural_annotation_set::id.eq(set_id)))
        .execute(conn)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::DocumentMetadata;
    use crate::repository::content_tree;
    use crate::repository::test_support::test_conn;

    #[test]
    fn get_or_create_is_idempotent_on_hash() {
        let mut conn = test_conn();
        let (first, created_first) =
            get_or_create(&mut conn, "hash-a", "alice", &StructuralSetDefaults::default()).unwrap();
        let (second, created_second) =
            get_or_create(&mut conn, "hash-a", "alice", &StructuralSetDefaults::default()).unwrap();
        assert!(created_first);
        assert!(!created_second);
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn migrate_document_skips_when_already_linked() {
        let mut conn = test_conn();
        let meta = DocumentMetadata::default();
        let doc = content_tree::new_isolated(&mut conn, "hash-b", "blob".into(), "alice", &meta, None, None).unwrap();
        migrate_document(&mut conn, &doc, "alice", false).unwrap();
        let migrated = content_tree::find_by_id(&mut conn, &doc.id).unwrap();
        assert!(migrated.structural_annotation_set.is_some());

        // Second call is a no-op, not an error.
        migrate_document(&mut conn, &migrated, "alice", false).unwrap();
    }
}
