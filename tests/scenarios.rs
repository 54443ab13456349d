mod common;

use common::test_conn;
use corpus_engine::collaborators::AllowAllAuthority;
use corpus_engine::hash::sha256_hex;
use corpus_engine::models::document::DocumentMetadata;
use corpus_engine::models::NewAnnotation;
use corpus_engine::repository::query_plane::{self, AnnotationFilters};
use corpus_engine::repository::{path_tree, structural_set_store};
use corpus_engine::schema::annotation;
use diesel::prelude::*;

fn import(conn: &mut diesel::SqliteConnection, corpus: &str, path: &str, bytes: &[u8]) -> path_tree::ImportOutcome {
    let handle = sha256_hex(bytes);
    path_tree::import(conn, corpus, path, bytes, handle, "alice", None, DocumentMetadata::default()).unwrap()
}

/// Scenario D — structural set sharing: two documents in different
/// corpuses, sharing one content-hash-keyed structural set, both see the
/// same structural annotations plus their own corpus-specific rows.
#[test]
fn scenario_d_structural_set_sharing() {
    let mut conn = test_conn();

    let a = import(&mut conn, "c1", "/s.pdf", b"shared-content");
    let b = import(&mut conn, "c2", "/s.pdf", b"shared-content");
    assert_eq!(b.document.source_document.as_deref(), Some(a.document.id.as_str()));

    let (set, _) = structural_set_store::get_or_create(
        &mut conn,
        a.document.pdf_file_hash.as_deref().unwrap(),
        "alice",
        &Default::default(),
    )
    .unwrap();
    structural_set_store::attach_to_document(&mut conn, &a.document.id, &set.id).unwrap();
    structural_set_store::attach_to_document(&mut conn, &b.document.id, &set.id).unwrap();

    for label in ["heading-1", "paragraph-1"] {
        let mut row = NewAnnotation::for_document("ignored", "ignored", "alice", Some(label.to_string()));
        row.document = None;
        row.corpus = None;
        row.structural = true;
        row.structural_set = Some(set.id.clone());
        row.annotation_label = Some(label.to_string());
        diesel::insert_into(annotation::table).values(&row).execute(&mut conn).unwrap();
    }

    // A corpus-specific, non-structural annotation in each corpus.
    let own_a = NewAnnotation::for_document(a.document.id.clone(), "c1", "alice", Some("note in c1".into()));
    diesel::insert_into(annotation::table).values(&own_a).execute(&mut conn).unwrap();
    let own_b = NewAnnotation::for_document(b.document.id.clone(), "c2", "alice", Some("note in c2".into()));
    diesel::insert_into(annotation::table).values(&own_b).execute(&mut conn).unwrap();

    let authority = AllowAllAuthority;

    let for_a = query_plane::annotations(
        &mut conn,
        &authority,
        Some("alice"),
        &AnnotationFilters { document_id: Some(a.document.id.clone()), corpus_id: Some("c1".into()), ..Default::default() },
    )
    .unwrap();
    let for_b = query_plane::annotations(
        &mut conn,
        &authority,
        Some("alice"),
        &AnnotationFilters { document_id: Some(b.document.id.clone()), corpus_id: Some("c2".into()), ..Default::default() },
    )
    .unwrap();

    // Both sides see the two structural rows plus their own note — three total.
    assert_eq!(for_a.len(), 3);
    assert_eq!(for_b.len(), 3);

    let structural_count_a = for_a.iter().filter(|r| r.annotation.structural_set.is_some()).count();
    let structural_count_b = for_b.iter().filter(|r| r.annotation.structural_set.is_some()).count();
    assert_eq!(structural_count_a, 2);
    assert_eq!(structural_count_b, 2);
}

/// Scenario E — time travel after delete.
#[test]
fn scenario_e_time_travel_after_delete() {
    let mut conn = test_conn();
    let authority = AllowAllAuthority;

    import(&mut conn, "c1", "/d.pdf", b"content");
    let t0 = chrono::Utc::now().to_rfc3339();
    std::thread::sleep(std::time::Duration::from_millis(5));
    path_tree::delete(&mut conn, "c1", "/d.pdf", "alice").unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let t1 = chrono::Utc::now().to_rfc3339();

    let at_t0 = query_plane::filesystem_at(&mut conn, &authority, "c1", &t0, Some("alice")).unwrap();
    assert_eq!(at_t0.len(), 1);

    let at_t1 = query_plane::filesystem_at(&mut conn, &authority, "c1", &t1, Some("alice")).unwrap();
    assert!(at_t1.is_empty());

    let current = query_plane::current_filesystem(&mut conn, &authority, "c1", Some("alice")).unwrap();
    assert!(current.is_empty());
}

/// Scenario F — truly-deleted predicate is per-corpus, not global.
#[test]
fn scenario_f_truly_deleted_predicate() {
    let mut conn = test_conn();
    let a = import(&mut conn, "c1", "/s.pdf", b"shared");
    import(&mut conn, "c2", "/s.pdf", b"shared");
    path_tree::delete(&mut conn, "c1", "/s.pdf", "alice").unwrap();

    assert!(query_plane::is_content_truly_deleted(&mut conn, &a.document.id, "c1").unwrap());
    assert!(!query_plane::is_content_truly_deleted(&mut conn, &a.document.id, "c2").unwrap());
}
