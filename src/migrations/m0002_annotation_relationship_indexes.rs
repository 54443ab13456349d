//! Lookup indexes for the version-aware annotation/relationship queries
//! in §4.5.3. Not part of the initial schema so that the constraint-
//! bearing `CREATE TABLE` statements in `m0001_initial` stay focused on
//! correctness, and index tuning can evolve independently.

use cetane::prelude::{AddIndex, Index, Migration};

pub fn migration() -> Migration {
    Migration::new("0002_annotation_relationship_indexes")
        .depends_on(&["0001_initial"])
        .operation(AddIndex::new("annotation", Index::new("annotation_document_idx").column("document")))
        .operation(AddIndex::new("annotation", Index::new("annotation_structural_set_idx").column("structural_set")))
        .operation(AddIndex::new("annotation", Index::new("annotation_corpus_idx").column("corpus")))
        .operation(AddIndex::new("relationship", Index::new("relationship_document_idx").column("document")))
        .operation(AddIndex::new("relationship", Index::new("relationship_structural_set_idx").column("structural_set")))
        .operation(AddIndex::new("relationship", Index::new("relationship_corpus_idx").column("corpus")))
}
