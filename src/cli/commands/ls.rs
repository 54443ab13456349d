use console::style;

use crate::collaborators::AllowAllAuthority;
use crate::repository::{query_plane, DbPool};

pub fn run(pool: &DbPool, corpus: &str, at: Option<String>, trash: bool, user: &str) -> anyhow::Result<()> {
    let mut conn = pool.get()?;
    let authority = AllowAllAuthority;

    let rows = if trash {
        query_plane::deleted_paths(&mut conn, &authority, corpus, Some(user))?
    } else if let Some(timestamp) = &at {
        query_plane::filesystem_at(&mut conn, &authority, corpus, timestamp, Some(user))?
    } else {
        query_plane::current_filesystem(&mut conn, &authority, corpus, Some(user))?
    };

    if rows.is_empty() {
        println!("{}", style("(empty)").dim());
        return Ok(());
    }

    for row in rows {
        println!("{:>4}  {}  {}", row.version_number, row.path, style(&row.document).dim());
    }
    Ok(())
}
