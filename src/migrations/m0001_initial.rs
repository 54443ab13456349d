//! Initial schema: every table in SPEC_FULL.md §3. CHECK constraints and
//! the C3/P4 partial unique indexes can't be added after the fact in
//! SQLite, so the tables that need them (`document`, `document_path`,
//! `annotation`, `relationship`) are created with a single `RunSql`
//! statement instead of the `CreateTable` builder; tables with no extra
//! constraints use the builder, matching the teacher's mix of both.

use cetane::prelude::{AddIndex, CreateTable, Field, FieldType, Index, Migration, RunSql};

pub fn migration() -> Migration {
    Migration::new("0001_initial")
        .depends_on(&[])
        .operation(
            CreateTable::new("corpus")
                .add_field(Field::new("id", FieldType::Text).primary_key())
                .add_field(Field::new("title", FieldType::Text).not_null())
                .add_field(Field::new("creator", FieldType::Text).not_null())
                .add_field(Field::new("is_public", FieldType::Boolean).not_null().default("0"))
                .add_field(Field::new("created", FieldType::Text).not_null())
                .add_field(Field::new("modified", FieldType::Text).not_null()),
        )
        .operation(
            CreateTable::new("corpus_folder")
                .add_field(Field::new("id", FieldType::Text).primary_key())
                .add_field(Field::new("corpus", FieldType::Text).not_null().references("corpus", "id"))
                .add_field(Field::new("parent", FieldType::Text).references("corpus_folder", "id"))
                .add_field(Field::new("name", FieldType::Text).not_null())
                .add_field(Field::new("creator", FieldType::Text).not_null())
                .add_field(Field::new("created", FieldType::Text).not_null())
                .add_field(Field::new("modified", FieldType::Text).not_null()),
        )
        .operation(RunSql::portable().for_backend(
            "sqlite",
            "CREATE UNIQUE INDEX corpus_folder_sibling_name_uniq
               ON corpus_folder (corpus, IFNULL(parent, ''), name);",
        ))
        .operation(
            CreateTable::new("structural_annotation_set")
                .add_field(Field::new("id", FieldType::Text).primary_key())
                .add_field(Field::new("content_hash", FieldType::Text).not_null().unique())
                .add_field(Field::new("parser_name", FieldType::Text))
                .add_field(Field::new("parser_version", FieldType::Text))
                .add_field(Field::new("page_count", FieldType::Integer))
                .add_field(Field::new("token_count", FieldType::Integer))
                .add_field(Field::new("pawls_parse_file", FieldType::Text))
                .add_field(Field::new("txt_extract_file", FieldType::Text))
                .add_field(Field::new("creator", FieldType::Text).not_null())
                .add_field(Field::new("created", FieldType::Text).not_null())
                .add_field(Field::new("modified", FieldType::Text).not_null()),
        )
        .operation(RunSql::portable().for_backend(
            "sqlite",
            "CREATE TABLE document (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                file_type TEXT NOT NULL,
                pdf_file TEXT,
                txt_extract_file TEXT,
                pawls_parse_file TEXT,
                md_summary_file TEXT,
                icon TEXT,
                pdf_file_hash TEXT,
                page_count INTEGER,
                version_tree_id TEXT NOT NULL,
                parent TEXT REFERENCES document(id),
                is_current BOOLEAN NOT NULL,
                source_document TEXT REFERENCES document(id),
                structural_annotation_set TEXT REFERENCES structural_annotation_set(id),
                creator TEXT NOT NULL,
                created TEXT NOT NULL,
                modified TEXT NOT NULL
            );",
        ))
        // C3: at most one current row per version_tree_id.
        .operation(RunSql::portable().for_backend(
            "sqlite",
            "CREATE UNIQUE INDEX document_version_tree_current_uniq
               ON document (version_tree_id) WHERE is_current;",
        ))
        .operation(RunSql::portable().for_backend(
            "sqlite",
            "CREATE TABLE document_path (
                id TEXT PRIMARY KEY,
                document TEXT NOT NULL REFERENCES document(id),
                corpus TEXT NOT NULL REFERENCES corpus(id) ON DELETE CASCADE,
                folder TEXT REFERENCES corpus_folder(id) ON DELETE SET NULL,
                path TEXT NOT NULL,
                version_number INTEGER NOT NULL,
                parent TEXT REFERENCES document_path(id),
                is_current BOOLEAN NOT NULL,
                is_deleted BOOLEAN NOT NULL,
                creator TEXT NOT NULL,
                created TEXT NOT NULL,
                modified TEXT NOT NULL,
                CHECK (length(path) <= 1024)
            );",
        ))
        // P4: at most one active path per (corpus, path).
        .operation(RunSql::portable().for_backend(
            "sqlite",
            "CREATE UNIQUE INDEX document_path_active_uniq
               ON document_path (corpus, path) WHERE is_current AND NOT is_deleted;",
        ))
        .operation(
            AddIndex::new("document_path", Index::new("document_path_corpus_state_idx").column("corpus").column("is_current").column("is_deleted")),
        )
        .operation(AddIndex::new("document_path", Index::new("document_path_document_corpus_idx").column("document").column("corpus")))
        .operation(AddIndex::new("document_path", Index::new("document_path_path_idx").column("path")))
        .operation(AddIndex::new("document_path", Index::new("document_path_version_number_idx").column("version_number")))
        .operation(AddIndex::new("document_path", Index::new("document_path_created_idx").column("created")))
        .operation(RunSql::portable().for_backend(
            "sqlite",
            "CREATE TABLE annotation (
                id TEXT PRIMARY KEY,
                raw_text TEXT,
                page INTEGER,
                annotation_label TEXT,
                structural BOOLEAN NOT NULL DEFAULT 0,
                is_public BOOLEAN NOT NULL DEFAULT 0,
                document TEXT REFERENCES document(id) ON DELETE CASCADE,
                structural_set TEXT REFERENCES structural_annotation_set(id) ON DELETE CASCADE,
                corpus TEXT REFERENCES corpus(id),
                creator TEXT NOT NULL,
                created TEXT NOT NULL,
                modified TEXT NOT NULL,
                CHECK ((document IS NOT NULL AND structural_set IS NULL)
                    OR (document IS NULL AND structural_set IS NOT NULL)),
                CHECK (structural_set IS NULL OR structural = 1)
            );",
        ))
        .operation(RunSql::portable().for_backend(
            "sqlite",
            "CREATE TABLE relationship (
                id TEXT PRIMARY KEY,
                relationship_label TEXT,
                structural BOOLEAN NOT NULL DEFAULT 0,
                is_public BOOLEAN NOT NULL DEFAULT 0,
                document TEXT REFERENCES document(id) ON DELETE CASCADE,
                structural_set TEXT REFERENCES structural_annotation_set(id) ON DELETE CASCADE,
                corpus TEXT REFERENCES corpus(id),
                creator TEXT NOT NULL,
                created TEXT NOT NULL,
                modified TEXT NOT NULL,
                CHECK ((document IS NOT NULL AND structural_set IS NULL)
                    OR (document IS NULL AND structural_set IS NOT NULL)),
                CHECK (structural_set IS NULL OR structural = 1)
            );",
        ))
        .operation(RunSql::portable().for_backend(
            "sqlite",
            "CREATE TABLE relationship_source_annotations (
                relationship_id TEXT NOT NULL REFERENCES relationship(id) ON DELETE CASCADE,
                annotation_id TEXT NOT NULL REFERENCES annotation(id) ON DELETE CASCADE,
                PRIMARY KEY (relationship_id, annotation_id)
            );",
        ))
        .operation(RunSql::portable().for_backend(
            "sqlite",
            "CREATE TABLE relationship_target_annotations (
                relationship_id TEXT NOT NULL REFERENCES relationship(id) ON DELETE CASCADE,
                annotation_id TEXT NOT NULL REFERENCES annotation(id) ON DELETE CASCADE,
                PRIMARY KEY (relationship_id, annotation_id)
            );",
        ))
}
