use console::style;

use crate::repository::{path_tree, DbPool};

pub fn run(pool: &DbPool, corpus: &str, path: &str, user: &str) -> anyhow::Result<()> {
    let mut conn = pool.get()?;
    let node = path_tree::delete(&mut conn, corpus, path, user)?;
    println!("{} {} (path {})", style("delete").red(), path, node.id);
    Ok(())
}
