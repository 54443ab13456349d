use diesel::prelude::*;

use crate::models::corpus::now_rfc3339;
use crate::schema::document_path;

/// A lifecycle node (§3 DocumentPath). Append-only; `parent` walks the
/// history of a single `(corpus, path)` line backwards.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = document_path)]
#[diesel(primary_key(id))]
pub struct DocumentPath {
    pub id: String,
    pub document: String,
    pub corpus: String,
    pub folder: Option<String>,
    pub path: String,
    pub version_number: i32,
    pub parent: Option<String>,
    pub is_current: bool,
    pub is_deleted: bool,
    pub creator: String,
    pub created: String,
    pub modified: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = document_path)]
pub struct NewDocumentPath {
    pub id: String,
    pub document: String,
    pub corpus: String,
    pub folder: Option<String>,
    pub path: String,
    pub version_number: i32,
    pub parent: Option<String>,
    pub is_current: bool,
    pub is_deleted: bool,
    pub creator: String,
    pub created: String,
    pub modified: String,
}

impl NewDocumentPath {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        document: impl Into<String>,
        corpus: impl Into<String>,
        folder: Option<String>,
        path: impl Into<String>,
        version_number: i32,
        parent: Option<String>,
        is_deleted: bool,
        creator: impl Into<String>,
    ) -> Self {
        let now = now_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            document: document.into(),
            corpus: corpus.into(),
            folder,
            path: path.into(),
            version_number,
            parent,
            is_current: true,
            is_deleted,
            creator: creator.into(),
            created: now.clone(),
            modified: now,
        }
    }
}

/// Resolves the sentinel `"UNSET"` from spec §9 open question 3 into a real
/// enum: `move`'s folder parameter needs three states, not two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderChange {
    /// Keep the folder the path currently has.
    Unchanged,
    /// Explicitly place the path at the corpus root.
    MoveToRoot,
    /// Explicitly move to the named folder.
    MoveTo(String),
}

impl FolderChange {
    /// Resolves against the path's current folder.
    pub fn resolve(&self, current_folder: Option<&str>) -> Option<String> {
        match self {
            FolderChange::Unchanged => current_folder.map(|s| s.to_string()),
            FolderChange::MoveToRoot => None,
            FolderChange::MoveTo(folder) => Some(folder.clone()),
        }
    }
}

/// Derived label for a `path_history` transition (§4.5.2). Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathAction {
    Created,
    Moved,
    Updated,
    Deleted,
    Restored,
    Unknown,
}

impl PathAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathAction::Created => "CREATED",
            PathAction::Moved => "MOVED",
            PathAction::Updated => "UPDATED",
            PathAction::Deleted => "DELETED",
            PathAction::Restored => "RESTORED",
            PathAction::Unknown => "UNKNOWN",
        }
    }

    /// Derives the action a `current` node represents relative to its
    /// `parent`, per the rules in spec §4.5.2. Rules are checked in the
    /// order the spec lists them.
    pub fn derive(current: &DocumentPath, parent: Option<&DocumentPath>) -> Self {
        let parent = match parent {
            None => return PathAction::Created,
            Some(p) => p,
        };
        if parent.is_deleted && !current.is_deleted {
            return PathAction::Restored;
        }
        if !parent.is_deleted && current.is_deleted {
            return PathAction::Deleted;
        }
        if parent.path != current.path {
            return PathAction::Moved;
        }
        if parent.document != current.document {
            return PathAction::Updated;
        }
        PathAction::Unknown
    }
}

impl std::fmt::Display for PathAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
