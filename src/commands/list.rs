//! List site content

use anyhow::Result;

use crate::content::{ContentKind, ContentRepository, Document};
use crate::Folio;

/// List visible documents, one kind or all of them
pub fn run(folio: &Folio, kind: Option<ContentKind>) -> Result<()> {
    let repo = ContentRepository::new(folio);
    let kinds: Vec<ContentKind> = match kind {
        Some(kind) => vec![kind],
        None => ContentKind::ALL.to_vec(),
    };

    for kind in kinds {
        print!("{}", listing(&repo, kind));
    }
    Ok(())
}

fn listing(repo: &ContentRepository, kind: ContentKind) -> String {
    let docs = repo.list(kind);
    let mut out = format!("{} ({}):\n", heading(kind), docs.len());
    for doc in &docs {
        out.push_str(&format!("  {}\n", entry(doc)));
    }
    out
}

fn heading(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::BlogPost => "Blog posts",
        ContentKind::CaseStudy => "Case studies",
    }
}

fn entry(doc: &Document) -> String {
    let fm = &doc.front_matter;
    let when = match doc.kind {
        ContentKind::BlogPost => fm
            .parse_published_at()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".to_string()),
        ContentKind::CaseStudy => fm.timeline.clone().unwrap_or_default(),
    };

    let mut line = format!("{} - {} [{}]", doc.slug, doc.title(), doc.status().label());
    if !when.is_empty() {
        line.push_str(&format!(" {}", when));
    }
    if !fm.category.is_empty() {
        line.push_str(&format!(" ({})", fm.category));
    }
    line
}
