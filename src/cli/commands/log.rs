use console::style;

use crate::repository::{query_plane, DbPool};

pub fn run(pool: &DbPool, corpus: &str, path: &str) -> anyhow::Result<()> {
    let mut conn = pool.get()?;
    let terminal = query_plane::find_terminal_node_for_path(&mut conn, corpus, path)?;
    let history = query_plane::path_history(&mut conn, &terminal.id)?;

    for entry in history {
        println!("{}  {:<9}  v{}  {}", entry.timestamp, style(entry.action.as_str()).yellow(), entry.version_number, entry.path);
    }
    Ok(())
}
