//! Report how every indexed document resolves

use anyhow::Result;

use crate::content::{ContentKind, ContentRepository, Resolution};
use crate::Folio;

/// Print one line per indexed slug. Fails if any document is unreadable
/// or does not compile.
pub fn run(folio: &Folio, kind: Option<ContentKind>) -> Result<()> {
    let repo = ContentRepository::new(folio);
    let kinds: Vec<ContentKind> = match kind {
        Some(kind) => vec![kind],
        None => ContentKind::ALL.to_vec(),
    };

    let mut broken = 0;
    for kind in kinds {
        let report = check(&repo, kind);
        println!("{} ({}):", kind.route(), report.len());
        for (slug, resolution) in &report {
            println!("  {:<32} {}", slug, resolution.describe());
        }
        broken += report.iter().filter(|(_, r)| is_broken(r)).count();
    }

    if broken > 0 {
        anyhow::bail!("{} document(s) failed to load", broken);
    }
    Ok(())
}

fn check(repo: &ContentRepository, kind: ContentKind) -> Vec<(String, Resolution)> {
    repo.resolve_all(kind)
}

fn is_broken(resolution: &Resolution) -> bool {
    matches!(
        resolution,
        Resolution::Invalid(_) | Resolution::CompileFailed(_)
    )
}
