//! Diesel schema definitions.
//!
//! Hand-written (not `diesel print-schema`-generated) to keep the table
//! declarations next to the migrations that create them, the way the
//! teacher's `schema.rs` is maintained by hand alongside `migrations/`.
//!
//! CHECK constraints and partial unique indexes referenced in
//! SPEC_FULL.md §3/§6 are not expressible in `table!` macros; they live in
//! `migrations/` and are enforced by SQLite at the row level, not by Diesel.

diesel::table! {
    corpus (id) {
        id -> Text,
        title -> Text,
        creator -> Text,
        is_public -> Bool,
        created -> Text,
        modified -> Text,
    }
}

diesel::table! {
    corpus_folder (id) {
        id -> Text,
        corpus -> Text,
        parent -> Nullable<Text>,
        name -> Text,
        creator -> Text,
        created -> Text,
        modified -> Text,
    }
}

diesel::table! {
    document (id) {
        id -> Text,
        title -> Text,
        file_type -> Text,
        pdf_file -> Nullable<Text>,
        txt_extract_file -> Nullable<Text>,
        pawls_parse_file -> Nullable<Text>,
        md_summary_file -> Nullable<Text>,
        icon -> Nullable<Text>,
        pdf_file_hash -> Nullable<Text>,
        page_count -> Nullable<Integer>,
        version_tree_id -> Text,
        parent -> Nullable<Text>,
        is_current -> Bool,
        source_document -> Nullable<Text>,
        structural_annotation_set -> Nullable<Text>,
        creator -> Text,
        created -> Text,
        modified -> Text,
    }
}

diesel::table! {
    document_path (id) {
        id -> Text,
        document -> Text,
        corpus -> Text,
        folder -> Nullable<Text>,
        path -> Text,
        version_number -> Integer,
        parent -> Nullable<Text>,
        is_current -> Bool,
        is_deleted -> Bool,
        creator -> Text,
        created -> Text,
        modified -> Text,
    }
}

diesel::table! {
    structural_annotation_set (id) {
        id -> Text,
        content_hash -> Text,
        parser_name -> Nullable<Text>,
        parser_version -> Nullable<Text>,
        page_count -> Nullable<Integer>,
        token_count -> Nullable<Integer>,
        pawls_parse_file -> Nullable<Text>,
        txt_extract_file -> Nullable<Text>,
        creator -> Text,
        created -> Text,
        modified -> Text,
    }
}

diesel::table! {
    annotation (id) {
        id -> Text,
        raw_text -> Nullable<Text>,
        page -> Nullable<Integer>,
        annotation_label -> Nullable<Text>,
        structural -> Bool,
        is_public -> Bool,
        document -> Nullable<Text>,
        structural_set -> Nullable<Text>,
        corpus -> Nullable<Text>,
        creator -> Text,
        created -> Text,
        modified -> Text,
    }
}

diesel::table! {
    relationship (id) {
        id -> Text,
        relationship_label -> Nullable<Text>,
        structural -> Bool,
        is_public -> Bool,
        document -> Nullable<Text>,
        structural_set -> Nullable<Text>,
        corpus -> Nullable<Text>,
        creator -> Text,
        created -> Text,
        modified -> Text,
    }
}

diesel::table! {
    relationship_source_annotations (relationship_id, annotation_id) {
        relationship_id -> Text,
        annotation_id -> Text,
    }
}

diesel::table! {
    relationship_target_annotations (relationship_id, annotation_id) {
        relationship_id -> Text,
        annotation_id -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    corpus,
    corpus_folder,
    document,
    document_path,
    structural_annotation_set,
    annotation,
    relationship,
    relationship_source_annotations,
    relationship_target_annotations,
);
