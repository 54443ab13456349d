use diesel::prelude::*;

use crate::models::corpus::now_rfc3339;
use crate::schema::{annotation, relationship};

/// Either bound to a specific `Document` or to a content-hash-shared
/// `StructuralAnnotationSet`, never both (XOR invariant, enforced by a DB
/// CHECK created in `migrations`, re-validated defensively in
/// `repository::structural_set_store`).
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = annotation)]
#[diesel(primary_key(id))]
pub struct Annotation {
    pub id: String,
    pub raw_text: Option<String>,
    pub page: Option<i32>,
    pub annotation_label: Option<String>,
    pub structural: bool,
    pub is_public: bool,
    pub document: Option<String>,
    pub structural_set: Option<String>,
    pub corpus: Option<String>,
    pub creator: String,
    pub created: String,
    pub modified: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = annotation)]
pub struct NewAnnotation {
    pub id: String,
    pub raw_text: Option<String>,
    pub page: Option<i32>,
    pub annotation_label: Option<String>,
    pub structural: bool,
    pub is_public: bool,
    pub document: Option<String>,
    pub structural_set: Option<String>,
    pub corpus: Option<String>,
    pub creator: String,
    pub created: String,
    pub modified: String,
}

impl NewAnnotation {
    pub fn for_document(
        document: impl Into<String>,
        corpus: impl Into<String>,
        creator: impl Into<String>,
        raw_text: Option<String>,
    ) -> Self {
        let now = now_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            raw_text,
            page: None,
            annotation_label: None,
            structural: false,
            is_public: false,
            document: Some(document.into()),
            structural_set: None,
            corpus: Some(corpus.into()),
            creator: creator.into(),
            created: now.clone(),
            modified: now,
        }
    }
}

/// Connects `source_annotations`/`target_annotations` (M2M, see
/// `schema::relationship_source_annotations` /
/// `relationship_target_annotations`). Carries the same XOR and
/// `structural_set ⇒ structural` invariants as `Annotation`.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = relationship)]
#[diesel(primary_key(id))]
pub struct Relationship {
    pub id: String,
    pub relationship_label: Option<String>,
    pub structural: bool,
    pub is_public: bool,
    pub document: Option<String>,
    pub structural_set: Option<String>,
    pub corpus: Option<String>,
    pub creator: String,
    pub created: String,
    pub modified: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = relationship)]
pub struct NewRelationship {
    pub id: String,
    pub relationship_label: Option<String>,
    pub structural: bool,
    pub is_public: bool,
    pub document: Option<String>,
    pub structural_set: Option<String>,
    pub corpus: Option<String>,
    pub creator: String,
    pub created: String,
    pub modified: String,
}
