//! C5 — QueryPlane. Read-only facade: "current filesystem", version/path
//! history, time-travel snapshots, and version-aware annotation/
//! relationship/vector queries. Permission filtering happens here, never
//! in `content_tree`/`path_tree`/`structural_set_store` (spec §4.5).

use std::collections::HashMap;

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::collaborators::{AuthorityOracle, Embedder, ScoredAnnotationId, VectorIndex, SUPPORTED_EMBEDDING_DIMENSIONS};
use crate::errors::{CoreError, Result};
use crate::models::document_path::PathAction;
use crate::models::{Annotation, Document, DocumentPath, Relationship};
use crate::repository::content_tree;
use crate::repository::predicate::{Field, Predicate, PredicateRow};
use crate::schema::{annotation, document, document_path, relationship};

/// All active paths in `corpus` (spec §4.5.1). The only non-historical
/// view.
pub fn current_filesystem(
    conn: &mut SqliteConnection,
    authority: &dyn AuthorityOracle,
    corpus: &str,
    user: Option<&str>,
) -> Result<Vec<DocumentPath>> {
    if !authority.can_read(user, corpus) {
        return Ok(Vec::new());
    }
    let rows = document_path::table
        .filter(document_path::corpus.eq(corpus))
        .filter(document_path::is_current.eq(true))
        .filter(document_path::is_deleted.eq(false))
        .select(DocumentPath::as_select())
        .load(conn)?;
    Ok(rows)
}

/// `deleted_documents(corpus)` (spec §4.5.1): trash view.
pub fn deleted_paths(
    conn: &mut SqliteConnection,
    authority: &dyn AuthorityOracle,
    corpus: &str,
    user: Option<&str>,
) -> Result<Vec<DocumentPath>> {
    if !authority.can_read(user, corpus) {
        return Ok(Vec::new());
    }
    let rows = document_path::table
        .filter(document_path::corpus.eq(corpus))
        .filter(document_path::is_current.eq(true))
        .filter(document_path::is_deleted.eq(true))
        .select(DocumentPath::as_select())
        .load(conn)?;
    Ok(rows)
}

/// `filesystem_at(corpus, T)` (spec §4.5.1): for each distinct path,
/// select the row with `created <= T` and maximum `created`, then drop
/// rows with `is_deleted = true`. Exact time-travel.
pub fn filesystem_at(
    conn: &mut SqliteConnection,
    authority: &dyn AuthorityOracle,
    corpus: &str,
    as_of: &str,
    user: Option<&str>,
) -> Result<Vec<DocumentPath>> {
    if !authority.can_read(user, corpus) {
        return Ok(Vec::new());
    }
    let candidates = document_path::table
        .filter(document_path::corpus.eq(corpus))
        .filter(document_path::created.le(as_of))
        .select(DocumentPath::as_select())
        .load(conn)?;

    let mut latest_by_path: HashMap<String, DocumentPath> = HashMap::new();
    for row in candidates {
        match latest_by_path.get(&row.path) {
            Some(existing) if existing.created >= row.created => {}
            _ => {
                latest_by_path.insert(row.path.clone(), row);
            }
        }
    }

    Ok(latest_by_path.into_values().filter(|row| !row.is_deleted).collect())
}

/// `content_history(document)` (spec §4.5.2).
pub fn content_history(conn: &mut SqliteConnection, document_id: &str) -> Result<Vec<Document>> {
    let doc = content_tree::find_by_id(conn, document_id)?;
    content_tree::content_history(conn, &doc)
}

#[derive(Debug, Clone)]
pub struct PathHistoryEntry {
    pub id: String,
    pub timestamp: String,
    pub path: String,
    pub version_number: i32,
    pub is_deleted: bool,
    pub document_id: String,
    pub action: PathAction,
}

/// `path_history(path_node)` (spec §4.5.2): oldest-first, with a derived
/// action label per transition.
pub fn path_history(conn: &mut SqliteConnection, path_node_id: &str) -> Result<Vec<PathHistoryEntry>> {
    let mut chain = Vec::new();
    let mut cursor = Some(find_path_by_id(conn, path_node_id)?);
    while let Some(node) = cursor {
        let parent = match &node.parent {
            Some(parent_id) => Some(find_path_by_id(conn, parent_id)?),
            None => None,
        };
        let action = PathAction::derive(&node, parent.as_ref());
        let next_cursor = parent.clone();
        chain.push(PathHistoryEntry {
            id: node.id.clone(),
            timestamp: node.created.clone(),
            path: node.path.clone(),
            version_number: node.version_number,
            is_deleted: node.is_deleted,
            document_id: node.document.clone(),
            action,
        });
        cursor = next_cursor;
    }
    chain.reverse();
    Ok(chain)
}

/// Terminal node for a `(corpus, path)` line, preferring an active line
/// over a soft-deleted one and the most recent among ties — used by the
/// `log` CLI command, which takes a path rather than a path-node id.
pub fn find_terminal_node_for_path(conn: &mut SqliteConnection, corpus: &str, path: &str) -> Result<DocumentPath> {
    let mut candidates = document_path::table
        .filter(document_path::corpus.eq(corpus))
        .filter(document_path::path.eq(path))
        .filter(document_path::is_current.eq(true))
        .select(DocumentPath::as_select())
        .load::<DocumentPath>(conn)?;

    candidates.sort_by(|a, b| a.is_deleted.cmp(&b.is_deleted).then(b.created.cmp(&a.created)));
    candidates.into_iter().next().ok_or_else(|| CoreError::NotFound(format!("path {corpus}:{path}")))
}

fn find_path_by_id(conn: &mut SqliteConnection, id: &str) -> Result<DocumentPath> {
    document_path::table
        .filter(document_path::id.eq(id))
        .select(DocumentPath::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| CoreError::NotFound(format!("document path {id}")))
}

/// Visibility/version-awareness options shared by annotation and
/// relationship queries (spec §4.5.3).
#[derive(Debug, Clone, Default)]
pub struct AnnotationFilters {
    pub document_id: Option<String>,
    pub corpus_id: Option<String>,
    pub only_current_versions: Option<bool>,
    pub include_deleted_corpus_docs: bool,
}

impl AnnotationFilters {
    fn only_current(&self) -> bool {
        self.only_current_versions.unwrap_or(true)
    }
}

#[derive(Debug, Clone)]
pub struct PermissionFlags {
    pub can_read: bool,
    pub can_update: bool,
    pub can_delete: bool,
}

#[derive(Debug, Clone)]
pub struct AnnotationRow {
    pub annotation: Annotation,
    pub permissions: PermissionFlags,
}

/// Per-row facts that can only be answered by a DB lookup, not read off
/// the row's own columns — the half of rules 1/2 the predicate AST can't
/// evaluate on its own.
struct RowContext<'a, T> {
    row: &'a T,
    is_current: bool,
    has_active_path: bool,
}

impl<'a> PredicateRow for RowContext<'a, Annotation> {
    fn text(&self, field: Field) -> Option<String> {
        match field {
            Field::Document => self.row.document.clone(),
            Field::StructuralSet => self.row.structural_set.clone(),
            Field::Corpus => self.row.corpus.clone(),
            Field::Creator => Some(self.row.creator.clone()),
            _ => None,
        }
    }

    fn boolean(&self, field: Field) -> Option<bool> {
        match field {
            Field::IsPublic => Some(self.row.is_public),
            Field::Structural => Some(self.row.structural),
            Field::IsCurrent => Some(self.is_current),
            Field::HasActivePath => Some(self.has_active_path),
            _ => None,
        }
    }
}

impl<'a> PredicateRow for RowContext<'a, Relationship> {
    fn text(&self, field: Field) -> Option<String> {
        match field {
            Field::Document => self.row.document.clone(),
            Field::StructuralSet => self.row.structural_set.clone(),
            Field::Corpus => self.row.corpus.clone(),
            Field::Creator => Some(self.row.creator.clone()),
            _ => None,
        }
    }

    fn boolean(&self, field: Field) -> Option<bool> {
        match field {
            Field::IsPublic => Some(self.row.is_public),
            Field::Structural => Some(self.row.structural),
            Field::IsCurrent => Some(self.is_current),
            Field::HasActivePath => Some(self.has_active_path),
            _ => None,
        }
    }
}

/// Builds rules 1, 2, 3/4, and 5 of spec §4.5.3 as a single `Predicate`,
/// the structural-set union (rule 3) resolved against `document_id`'s own
/// set unconditionally — not gated on whether the document already has a
/// direct row in the candidate set, which would wrongly drop the union
/// for documents with zero direct annotations/relationships.
fn version_aware_predicate(filters: &AnnotationFilters, user: Option<&str>, own_structural_set: Option<&str>) -> Predicate {
    let mut rules = Vec::new();

    if filters.only_current() {
        rules.push(Predicate::or([Predicate::IsNotNull(Field::StructuralSet), Predicate::eq_bool(Field::IsCurrent, true)]));
    }

    if filters.corpus_id.is_some() && !filters.include_deleted_corpus_docs {
        rules.push(Predicate::or([Predicate::IsNotNull(Field::StructuralSet), Predicate::eq_bool(Field::HasActivePath, true)]));
    }

    if let Some(document_id) = &filters.document_id {
        let own_row = Predicate::eq_text(Field::Document, document_id.clone());
        rules.push(match own_structural_set {
            Some(set_id) => Predicate::Union(
                Box::new(own_row),
                Box::new(Predicate::and([Predicate::eq_bool(Field::Structural, true), Predicate::eq_text(Field::StructuralSet, set_id.to_string())])),
            ),
            None => own_row,
        });
    } else if let Some(corpus_id) = &filters.corpus_id {
        rules.push(Predicate::or([Predicate::IsNotNull(Field::StructuralSet), Predicate::eq_text(Field::Corpus, corpus_id.clone())]));
    }

    rules.push(match user {
        Some(uid) => Predicate::or([Predicate::IsNotNull(Field::StructuralSet), Predicate::eq_text(Field::Creator, uid)]),
        None => Predicate::or([Predicate::IsNotNull(Field::StructuralSet), Predicate::eq_bool(Field::IsPublic, true)]),
    });

    Predicate::and(rules)
}

/// Version-aware annotation query (spec §4.5.3, rules 1-6).
pub fn annotations(
    conn: &mut SqliteConnection,
    authority: &dyn AuthorityOracle,
    user: Option<&str>,
    filters: &AnnotationFilters,
) -> Result<Vec<AnnotationRow>> {
    let candidates: Vec<Annotation> = annotation::table.select(Annotation::as_select()).load(conn)?;

    let own_structural_set = match &filters.document_id {
        Some(document_id) => document_structural_set(conn, document_id)?,
        None => None,
    };
    let predicate = version_aware_predicate(filters, user, own_structural_set.as_deref());

    let mut rows = Vec::with_capacity(candidates.len());
    for row in candidates {
        let context = RowContext {
            is_current: row.structural_set.is_some() || is_document_current(conn, row.document.as_deref()),
            has_active_path: match &filters.corpus_id {
                Some(corpus_id) => row.structural_set.is_some() || document_has_active_path(conn, row.document.as_deref(), corpus_id)?,
                None => true,
            },
            row: &row,
        };
        if predicate.matches(&context) {
            rows.push(row);
        }
    }

    // Rule 6: permission flags, computed once per (document, corpus, user).
    let mut flag_cache: HashMap<(Option<String>, Option<String>), PermissionFlags> = HashMap::new();
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let is_structural_row = row.structural_set.is_some();
        let key = (row.document.clone(), row.corpus.clone());
        let flags = flag_cache.entry(key).or_insert_with(|| {
            let object = row.document.clone().or_else(|| row.corpus.clone()).unwrap_or_default();
            PermissionFlags {
                can_read: authority.can_read(user, &object),
                can_update: !is_structural_row && authority.can_write(user, &object),
                can_delete: !is_structural_row && authority.can_delete(user, &object),
            }
        });
        if is_structural_row && (flags.can_update || flags.can_delete) {
            // Structural rows never receive write flags even if the
            // caller has write access to the document (spec rule 6).
            out.push(AnnotationRow {
                annotation: row,
                permissions: PermissionFlags { can_read: flags.can_read, can_update: false, can_delete: false },
            });
        } else {
            out.push(AnnotationRow { annotation: row, permissions: flags.clone() });
        }
    }
    Ok(out)
}

#[derive(Debug, Clone)]
pub struct RelationshipRow {
    pub relationship: Relationship,
    pub permissions: PermissionFlags,
}

/// Same rules as `annotations`, adapted to `Relationship`.
pub fn relationships(
    conn: &mut SqliteConnection,
    authority: &dyn AuthorityOracle,
    user: Option<&str>,
    filters: &AnnotationFilters,
) -> Result<Vec<RelationshipRow>> {
    let candidates: Vec<Relationship> = relationship::table.select(Relationship::as_select()).load(conn)?;

    let own_structural_set = match &filters.document_id {
        Some(document_id) => document_structural_set(conn, document_id)?,
        None => None,
    };
    let predicate = version_aware_predicate(filters, user, own_structural_set.as_deref());

    let mut rows = Vec::with_capacity(candidates.len());
    for row in candidates {
        let context = RowContext {
            is_current: row.structural_set.is_some() || is_document_current(conn, row.document.as_deref()),
            has_active_path: match &filters.corpus_id {
                Some(corpus_id) => row.structural_set.is_some() || document_has_active_path(conn, row.document.as_deref(), corpus_id)?,
                None => true,
            },
            row: &row,
        };
        if predicate.matches(&context) {
            rows.push(row);
        }
    }

    let mut flag_cache: HashMap<(Option<String>, Option<String>), PermissionFlags> = HashMap::new();
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let is_structural_row = row.structural_set.is_some();
        let key = (row.document.clone(), row.corpus.clone());
        let flags = flag_cache.entry(key).or_insert_with(|| {
            let object = row.document.clone().or_else(|| row.corpus.clone()).unwrap_or_default();
            PermissionFlags {
                can_read: authority.can_read(user, &object),
                can_update: !is_structural_row && authority.can_write(user, &object),
                can_delete: !is_structural_row && authority.can_delete(user, &object),
            }
        });
        out.push(RelationshipRow { relationship: row, permissions: flags.clone() });
    }
    Ok(out)
}

fn is_document_current(conn: &mut SqliteConnection, document_id: Option<&str>) -> bool {
    match document_id {
        None => false,
        Some(id) => document::table
            .filter(document::id.eq(id))
            .select(document::is_current)
            .first::<bool>(conn)
            .unwrap_or(false),
    }
}

fn document_has_active_path(conn: &mut SqliteConnection, document_id: Option<&str>, corpus_id: &str) -> Result<bool> {
    let Some(id) = document_id else { return Ok(false) };
    let count: i64 = document_path::table
        .filter(document_path::document.eq(id))
        .filter(document_path::corpus.eq(corpus_id))
        .filter(document_path::is_current.eq(true))
        .filter(document_path::is_deleted.eq(false))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

fn document_structural_set(conn: &mut SqliteConnection, document_id: &str) -> Result<Option<String>> {
    Ok(document::table
        .filter(document::id.eq(document_id))
        .select(document::structural_annotation_set)
        .first(conn)
        .optional()?
        .flatten())
}

/// `is_content_truly_deleted(document_id, corpus_id)` (spec §6 predicate):
/// true iff no `DocumentPath` with `(document, corpus, is_current, not
/// is_deleted)`.
pub fn is_content_truly_deleted(conn: &mut SqliteConnection, document_id: &str, corpus_id: &str) -> Result<bool> {
    Ok(!document_has_active_path(conn, Some(document_id), corpus_id)?)
}

#[derive(Debug, Clone)]
pub struct VectorQuery {
    pub query_text: Option<String>,
    pub query_embedding: Option<Vec<f32>>,
    pub top_k: usize,
}

#[derive(Debug, Clone)]
pub struct ScoredAnnotation {
    pub annotation: Annotation,
    pub similarity_score: f32,
}

/// `vector_search` (spec §4.5.4). Builds the base annotation set with the
/// same version-aware rules as `annotations`, then either delegates to
/// the vector index (supported dimensions) or falls back to a plain
/// `LIMIT top_k` scan with a uniform score.
pub fn vector_search(
    conn: &mut SqliteConnection,
    authority: &dyn AuthorityOracle,
    embedder: &dyn Embedder,
    index: &dyn VectorIndex,
    user: Option<&str>,
    filters: &AnnotationFilters,
    query: &VectorQuery,
) -> Result<Vec<ScoredAnnotation>> {
    let mut scoped_filters = filters.clone();
    scoped_filters.include_deleted_corpus_docs = false;
    let candidates = annotations(conn, authority, user, &scoped_filters)?;
    let by_id: HashMap<String, Annotation> =
        candidates.iter().map(|row| (row.annotation.id.clone(), row.annotation.clone())).collect();

    let embedding = match (&query.query_embedding, &query.query_text) {
        (Some(vector), _) => Some(vector.clone()),
        (None, Some(text)) => Some(embedder.embed(text).map_err(|e| CoreError::Transient(e.to_string()))?),
        (None, None) => None,
    };

    let ids: Vec<String> = by_id.keys().cloned().collect();

    if let Some(vector) = embedding.filter(|v| SUPPORTED_EMBEDDING_DIMENSIONS.contains(&v.len())) {
        let scored: Vec<ScoredAnnotationId> = index
            .search_by_embedding(&ids, &vector, query.top_k)
            .map_err(|e| CoreError::Transient(e.to_string()))?;
        Ok(scored
            .into_iter()
            .filter_map(|s| by_id.get(&s.annotation_id).cloned().map(|a| ScoredAnnotation { annotation: a, similarity_score: s.similarity_score }))
            .collect())
    } else {
        Ok(candidates
            .into_iter()
            .take(query.top_k)
            .map(|row| ScoredAnnotation { annotation: row.annotation, similarity_score: 1.0 })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::AllowAllAuthority;
    use crate::models::document::DocumentMetadata;
    use crate::models::NewAnnotation;
    use crate::repository::{path_tree, test_support::test_conn};

    #[test]
    fn filesystem_at_reflects_delete_boundary() {
        let mut conn = test_conn();
        let handle = crate::hash::sha256_hex(b"v1");
        path_tree::import(&mut conn, "c1", "/d.pdf", b"v1", handle, "u", None, DocumentMetadata::default()).unwrap();
        let t0 = chrono::Utc::now().to_rfc3339();
        std::thread::sleep(std::time::Duration::from_millis(5));
        path_tree::delete(&mut conn, "c1", "/d.pdf", "u").unwrap();
        let t1 = chrono::Utc::now().to_rfc3339();

        let authority = AllowAllAuthority;
        let at_t0 = filesystem_at(&mut conn, &authority, "c1", &t0, Some("u")).unwrap();
        assert_eq!(at_t0.len(), 1);

        let at_t1 = filesystem_at(&mut conn, &authority, "c1", &t1, Some("u")).unwrap();
        assert!(at_t1.is_empty());

        let current = current_filesystem(&mut conn, &authority, "c1", Some("u")).unwrap();
        assert!(current.is_empty());
    }

    #[test]
    fn truly_deleted_predicate_is_per_corpus() {
        let mut conn = test_conn();
        let handle = crate::hash::sha256_hex(b"shared");
        let a = path_tree::import(&mut conn, "c1", "/s.pdf", b"shared", handle.clone(), "u", None, DocumentMetadata::default()).unwrap();
        path_tree::import(&mut conn, "c2", "/s.pdf", b"shared", handle, "u", None, DocumentMetadata::default()).unwrap();
        path_tree::delete(&mut conn, "c1", "/s.pdf", "u").unwrap();

        assert!(is_content_truly_deleted(&mut conn, &a.document.id, "c1").unwrap());
        assert!(!is_content_truly_deleted(&mut conn, &a.document.id, "c2").unwrap());
    }

    #[test]
    fn structural_annotations_survive_current_version_filter() {
        let mut conn = test_conn();
        let set = crate::repository::structural_set_store::get_or_create(
            &mut conn,
            "hash-z",
            "u",
            &Default::default(),
        )
        .unwrap()
        .0;
        let mut row = NewAnnotation::for_document("ignored", "c1", "u", Some("structural text".into()));
        row.document = None;
        row.structural = true;
        row.structural_set = Some(set.id.clone());
        diesel::insert_into(crate::schema::annotation::table).values(&row).execute(&mut conn).unwrap();

        let authority = AllowAllAuthority;
        let filters = AnnotationFilters { only_current_versions: Some(true), ..Default::default() };
        let rows = annotations(&mut conn, &authority, Some("u"), &filters).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].permissions.can_update);
    }
}
