use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::schema::{corpus, corpus_folder};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = corpus)]
#[diesel(primary_key(id))]
pub struct Corpus {
    pub id: String,
    pub title: String,
    pub creator: String,
    pub is_public: bool,
    pub created: String,
    pub modified: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = corpus)]
pub struct NewCorpus {
    pub id: String,
    pub title: String,
    pub creator: String,
    pub is_public: bool,
    pub created: String,
    pub modified: String,
}

impl NewCorpus {
    pub fn new(title: impl Into<String>, creator: impl Into<String>, is_public: bool) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            creator: creator.into(),
            is_public,
            created: now.clone(),
            modified: now,
        }
    }
}

/// Folders are mutable and freely renamed/reparented; only deletion has a
/// specified side effect (nulling `document_path.folder`, never the path
/// string itself — see P6).
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = corpus_folder)]
#[diesel(primary_key(id))]
pub struct CorpusFolder {
    pub id: String,
    pub corpus: String,
    pub parent: Option<String>,
    pub name: String,
    pub creator: String,
    pub created: String,
    pub modified: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = corpus_folder)]
pub struct NewCorpusFolder {
    pub id: String,
    pub corpus: String,
    pub parent: Option<String>,
    pub name: String,
    pub creator: String,
    pub created: String,
    pub modified: String,
}

impl NewCorpusFolder {
    pub fn new(
        corpus: impl Into<String>,
        parent: Option<String>,
        name: impl Into<String>,
        creator: impl Into<String>,
    ) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            corpus: corpus.into(),
            parent,
            name: name.into(),
            creator: creator.into(),
            created: now.clone(),
            modified: now,
        }
    }
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc))
}
