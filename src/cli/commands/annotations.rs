use console::style;

use crate::collaborators::AllowAllAuthority;
use crate::repository::{
    query_plane::{self, AnnotationFilters},
    DbPool,
};

pub fn run(
    pool: &DbPool,
    corpus: &str,
    document: Option<String>,
    corpus_wide: bool,
    user: &str,
) -> anyhow::Result<()> {
    if document.is_none() && !corpus_wide {
        anyhow::bail!("pass either --document <id> or --corpus-wide");
    }

    let mut conn = pool.get()?;
    let authority = AllowAllAuthority;
    let filters = AnnotationFilters {
        document_id: document,
        corpus_id: Some(corpus.to_string()),
        ..Default::default()
    };

    let rows = query_plane::annotations(&mut conn, &authority, Some(user), &filters)?;
    if rows.is_empty() {
        println!("{}", style("(none)").dim());
        return Ok(());
    }
    for row in rows {
        let label = row.annotation.annotation_label.as_deref().unwrap_or("-");
        let kind = if row.annotation.structural_set.is_some() { "structural" } else { "document" };
        println!("{}  {}  {}", style(kind).dim(), label, row.annotation.raw_text.as_deref().unwrap_or(""));
    }
    Ok(())
}
