use diesel::prelude::*;

use crate::models::corpus::now_rfc3339;
use crate::schema::structural_annotation_set;

/// Shared, content-hash-keyed container for parser-produced annotations
/// (§3 StructuralAnnotationSet, §4.4 StructuralSetStore). `ON DELETE
/// PROTECT` from `document` is enforced at the application layer: SQLite
/// has no native `PROTECT` action, so deletion is refused in
/// `StructuralSetStore` rather than the schema.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = structural_annotation_set)]
#[diesel(primary_key(id))]
pub struct StructuralAnnotationSet {
    pub id: String,
    pub content_hash: String,
    pub parser_name: Option<String>,
    pub parser_version: Option<String>,
    pub page_count: Option<i32>,
    pub token_count: Option<i32>,
    pub pawls_parse_file: Option<String>,
    pub txt_extract_file: Option<String>,
    pub creator: String,
    pub created: String,
    pub modified: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = structural_annotation_set)]
pub struct NewStructuralAnnotationSet {
    pub id: String,
    pub content_hash: String,
    pub parser_name: Option<String>,
    pub parser_version: Option<String>,
    pub page_count: Option<i32>,
    pub token_count: Option<i32>,
    pub pawls_parse_file: Option<String>,
    pub txt_extract_file: Option<String>,
    pub creator: String,
    pub created: String,
    pub modified: String,
}

/// Optional fields supplied when a new set is first created for a hash.
#[derive(Debug, Clone, Default)]
pub struct StructuralSetDefaults {
    pub parser_name: Option<String>,
    pub parser_version: Option<String>,
    pub page_count: Option<i32>,
    pub token_count: Option<i32>,
    pub pawls_parse_file: Option<String>,
    pub txt_extract_file: Option<String>,
}

impl NewStructuralAnnotationSet {
    pub fn new(content_hash: impl Into<String>, creator: &str, defaults: &StructuralSetDefaults) -> Self {
        let now = now_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content_hash: content_hash.into(),
            parser_name: defaults.parser_name.clone(),
            parser_version: defaults.parser_version.clone(),
            page_count: defaults.page_count,
            token_count: defaults.token_count,
            pawls_parse_file: defaults.pawls_parse_file.clone(),
            txt_extract_file: defaults.txt_extract_file.clone(),
            creator: creator.to_string(),
            created: now.clone(),
            modified: now,
        }
    }
}
