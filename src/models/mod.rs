//! Row types for every table in `schema`.
//!
//! Split one file per entity family, mirroring the teacher's
//! `models/document.rs` layout (one file per aggregate, `Queryable` +
//! `Insertable` pairs named `X` / `NewX`).

pub mod annotation;
pub mod corpus;
pub mod document;
pub mod document_path;
pub mod structural_set;

pub use annotation::{Annotation, NewAnnotation, NewRelationship, Relationship};
pub use corpus::{Corpus, CorpusFolder, NewCorpus, NewCorpusFolder};
pub use document::{Document, ImportStatus, NewDocument};
pub use document_path::{DocumentPath, FolderChange, NewDocumentPath, PathAction};
pub use structural_set::{NewStructuralAnnotationSet, StructuralAnnotationSet};
