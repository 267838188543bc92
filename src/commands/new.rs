//! Create a new blog post or case study

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::repository::is_safe_slug;
use crate::content::ContentKind;
use crate::Folio;

/// Scaffold a draft document. Returns the path written.
pub fn create_document(
    folio: &Folio,
    kind: ContentKind,
    title: &str,
    slug: Option<&str>,
) -> Result<PathBuf> {
    let slug = match slug {
        Some(s) => s.to_string(),
        None => slug::slugify(title),
    };
    if !is_safe_slug(&slug) {
        anyhow::bail!("Invalid slug: {:?}", slug);
    }

    let collection = kind.collection(&folio.config);
    let target_dir = folio.collection_dir(kind);
    fs::create_dir_all(&target_dir)?;

    let file_path = target_dir.join(format!("{}.{}", slug, collection.extension));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    fs::write(&file_path, scaffold(kind, title))?;
    tracing::info!("Created {} {:?}", kind, file_path);

    if !collection.index.is_empty() {
        println!(
            "Note: {} uses an explicit index; add `{}` to it in _config.yml to list it.",
            kind.route(),
            slug
        );
    }

    Ok(file_path)
}

fn scaffold(kind: ContentKind, title: &str) -> String {
    let title = serde_yaml::to_string(title).unwrap_or_else(|_| format!("{:?}\n", title));
    let today = chrono::Local::now().format("%Y-%m-%d");

    match kind {
        ContentKind::BlogPost => format!(
            "---\ntitle: {}description: ''\nstatus: draft\ncategory: ''\ntags: []\npublishedAt: {}\n---\n\n",
            title, today
        ),
        ContentKind::CaseStudy => format!(
            concat!(
                "---\ntitle: {}description: ''\nstatus: draft\ncategory: ''\n",
                "technologies: []\ntimeline: ''\nteam_size: ''\nmetrics: []\n---\n\n",
                "## Context\n\n## Approach\n\n## Results\n\n",
                "<MetricGrid columns={{3}}>\n</MetricGrid>\n"
            ),
            title
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentRepository, Status, VisibilityPolicy};

    #[test]
    fn test_new_case_study_is_draft() {
        let tmp = tempfile::tempdir().unwrap();
        let folio = Folio::new(tmp.path()).unwrap();

        let path =
            create_document(&folio, ContentKind::CaseStudy, "Docs: AI Assistant", None).unwrap();
        assert!(path.ends_with("src/content/case-studies/docs-ai-assistant.mdx"));

        let mut policy = VisibilityPolicy::default();
        let hidden = ContentRepository::with_policy(&folio, policy);
        assert!(hidden
            .get_by_slug(ContentKind::CaseStudy, "docs-ai-assistant")
            .is_none());

        policy.set(ContentKind::CaseStudy, true);
        let shown = ContentRepository::with_policy(&folio, policy);
        let doc = shown
            .get_by_slug(ContentKind::CaseStudy, "docs-ai-assistant")
            .unwrap();
        assert_eq!(doc.title(), "Docs: AI Assistant");
        assert_eq!(doc.status(), Status::Draft);
    }

    #[test]
    fn test_new_blog_post_with_slug() {
        let tmp = tempfile::tempdir().unwrap();
        let folio = Folio::new(tmp.path()).unwrap();

        let path = create_document(&folio, ContentKind::BlogPost, "Hello", Some("first")).unwrap();
        assert!(path.ends_with("src/content/blog/first.mdx"));
        assert!(create_document(&folio, ContentKind::BlogPost, "Hello", Some("first")).is_err());
        assert!(create_document(&folio, ContentKind::BlogPost, "Hello", Some("../x")).is_err());
    }
}
