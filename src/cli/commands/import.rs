use std::path::Path;

use console::style;

use crate::collaborators::{BlobStore, InMemoryBlobStore};
use crate::models::document::DocumentMetadata;
use crate::repository::{path_tree, DbPool};

pub fn run(
    pool: &DbPool,
    corpus: &str,
    path: &str,
    file: &Path,
    folder: Option<String>,
    user: &str,
) -> anyhow::Result<()> {
    let bytes = std::fs::read(file)?;
    let blob_store = InMemoryBlobStore::new();
    let handle = blob_store.put(&bytes)?;

    let metadata = DocumentMetadata {
        title: file.file_name().map(|n| n.to_string_lossy().into_owned()),
        ..Default::default()
    };

    let mut conn = pool.get()?;
    let outcome = path_tree::import(&mut conn, corpus, path, &bytes, handle, user, folder, metadata)?;

    println!(
        "{} {} -> document {} (status: {})",
        style("import").cyan(),
        path,
        outcome.document.id,
        style(outcome.status.as_str()).yellow()
    );
    Ok(())
}
