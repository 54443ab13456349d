use console::style;

use crate::repository::{corpus, DbPool};

pub fn run(pool: &DbPool, title: &str, creator: &str) -> anyhow::Result<()> {
    let mut conn = pool.get()?;
    let created = corpus::create(&mut conn, title, creator, false)?;
    println!("{} corpus {} ({})", style("created").green(), style(title).bold(), created.id);
    Ok(())
}
