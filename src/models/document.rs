use diesel::prelude::*;

use crate::models::corpus::now_rfc3339;
use crate::schema::document;

/// Outcome of `PathTree::import`, returned to the caller — not persisted.
/// Grounded in the teacher's `DocumentStatus` (`src/models/document.rs`),
/// adapted from a document-download state machine to an import-result enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStatus {
    Created,
    CreatedFromExisting,
    Updated,
    Unchanged,
    Linked,
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStatus::Created => "created",
            ImportStatus::CreatedFromExisting => "created_from_existing",
            ImportStatus::Updated => "updated",
            ImportStatus::Unchanged => "unchanged",
            ImportStatus::Linked => "linked",
        }
    }
}

impl std::fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A content node (§3 Document). `version_tree_id` groups every row that
/// represents the same lineage; `parent` walks that lineage back in time.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = document)]
#[diesel(primary_key(id))]
pub struct Document {
    pub id: String,
    pub title: String,
    pub file_type: String,
    pub pdf_file: Option<String>,
    pub txt_extract_file: Option<String>,
    pub pawls_parse_file: Option<String>,
    pub md_summary_file: Option<String>,
    pub icon: Option<String>,
    pub pdf_file_hash: Option<String>,
    pub page_count: Option<i32>,
    pub version_tree_id: String,
    pub parent: Option<String>,
    pub is_current: bool,
    pub source_document: Option<String>,
    pub structural_annotation_set: Option<String>,
    pub creator: String,
    pub created: String,
    pub modified: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = document)]
pub struct NewDocument {
    pub id: String,
    pub title: String,
    pub file_type: String,
    pub pdf_file: Option<String>,
    pub txt_extract_file: Option<String>,
    pub pawls_parse_file: Option<String>,
    pub md_summary_file: Option<String>,
    pub icon: Option<String>,
    pub pdf_file_hash: Option<String>,
    pub page_count: Option<i32>,
    pub version_tree_id: String,
    pub parent: Option<String>,
    pub is_current: bool,
    pub source_document: Option<String>,
    pub structural_annotation_set: Option<String>,
    pub creator: String,
    pub created: String,
    pub modified: String,
}

/// Caller-supplied metadata attached to a newly-minted `Document` row.
/// Mirrors the `metadata` parameter in `import`/`new_version`/`new_isolated`
/// (spec §4.2-4.3); blob handles come from the `BlobStore` collaborator.
#[derive(Debug, Clone, Default)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub file_type: Option<String>,
    pub page_count: Option<i32>,
    pub txt_extract_file: Option<String>,
    pub pawls_parse_file: Option<String>,
    pub md_summary_file: Option<String>,
    pub icon: Option<String>,
}

impl NewDocument {
    /// A fresh root of a new lineage (`ContentTree::new_isolated`).
    pub fn isolated(
        hash: &str,
        blob_handle: String,
        creator: &str,
        metadata: &DocumentMetadata,
        source_document: Option<String>,
        structural_annotation_set: Option<String>,
    ) -> Self {
        let now = now_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: metadata.title.clone().unwrap_or_default(),
            file_type: metadata.file_type.clone().unwrap_or_else(|| "application/pdf".to_string()),
            pdf_file: Some(blob_handle),
            txt_extract_file: metadata.txt_extract_file.clone(),
            pawls_parse_file: metadata.pawls_parse_file.clone(),
            md_summary_file: metadata.md_summary_file.clone(),
            icon: metadata.icon.clone(),
            pdf_file_hash: Some(hash.to_string()),
            page_count: metadata.page_count,
            version_tree_id: uuid::Uuid::new_v4().to_string(),
            parent: None,
            is_current: true,
            source_document,
            structural_annotation_set,
            creator: creator.to_string(),
            created: now.clone(),
            modified: now,
        }
    }

    /// A new version within an existing lineage (`ContentTree::new_version`).
    /// Inherits `version_tree_id` and `structural_annotation_set` from
    /// `old`; caller is responsible for flipping `old.is_current` first.
    pub fn version_of(
        old: &super::Document,
        hash: &str,
        blob_handle: String,
        creator: &str,
        metadata: &DocumentMetadata,
    ) -> Self {
        let now = now_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: metadata.title.clone().unwrap_or_else(|| old.title.clone()),
            file_type: metadata.file_type.clone().unwrap_or_else(|| old.file_type.clone()),
            pdf_file: Some(blob_handle),
            txt_extract_file: metadata.txt_extract_file.clone().or_else(|| old.txt_extract_file.clone()),
            pawls_parse_file: metadata.pawls_parse_file.clone().or_else(|| old.pawls_parse_file.clone()),
            md_summary_file: metadata.md_summary_file.clone().or_else(|| old.md_summary_file.clone()),
            icon: metadata.icon.clone().or_else(|| old.icon.clone()),
            pdf_file_hash: Some(hash.to_string()),
            page_count: metadata.page_count.or(old.page_count),
            version_tree_id: old.version_tree_id.clone(),
            parent: Some(old.id.clone()),
            is_current: true,
            source_document: old.source_document.clone(),
            structural_annotation_set: old.structural_annotation_set.clone(),
            creator: creator.to_string(),
            created: now.clone(),
            modified: now,
        }
    }
}
