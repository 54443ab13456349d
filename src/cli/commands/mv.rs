use console::style;

use crate::models::document_path::FolderChange;
use crate::repository::{path_tree, DbPool};

pub fn run(
    pool: &DbPool,
    corpus: &str,
    old_path: &str,
    new_path: &str,
    folder: Option<String>,
    root: bool,
    user: &str,
) -> anyhow::Result<()> {
    let folder_change = match (root, folder) {
        (true, _) => FolderChange::MoveToRoot,
        (false, Some(id)) => FolderChange::MoveTo(id),
        (false, None) => FolderChange::Unchanged,
    };

    let mut conn = pool.get()?;
    let node = path_tree::move_path(&mut conn, corpus, old_path, new_path, user, folder_change)?;
    println!("{} {} -> {} (path {})", style("move").cyan(), old_path, new_path, node.id);
    Ok(())
}
