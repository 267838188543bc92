//! Content repository - resolves slugs to documents on disk

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::document::{Document, Resolution};
use super::error::{CompileError, ContentError};
use super::frontmatter::FrontMatter;
use super::kind::{BodyFormat, ContentKind};
use super::markdown::{ElementStyles, MarkdownRenderer};
use super::mdx::{ComponentRegistry, MdxCompiler};
use super::visibility::VisibilityPolicy;
use crate::config::SiteConfig;
use crate::Folio;

/// Reads blog posts and case studies from the content directory.
///
/// Nothing is cached: every lookup rereads the file.
pub struct ContentRepository {
    content_dir: PathBuf,
    config: SiteConfig,
    policy: VisibilityPolicy,
    compiler: MdxCompiler,
}

impl ContentRepository {
    /// Create a repository for the site, with draft toggles from the
    /// config file and environment
    pub fn new(folio: &Folio) -> Self {
        let policy = VisibilityPolicy::from_env(&folio.config);
        Self::with_policy(folio, policy)
    }

    pub fn with_policy(folio: &Folio, policy: VisibilityPolicy) -> Self {
        let highlight = &folio.config.highlight;
        let markdown =
            MarkdownRenderer::with_options(ElementStyles::portfolio(), &highlight.theme, highlight.enable);
        Self {
            content_dir: folio.content_dir.clone(),
            config: folio.config.clone(),
            policy,
            compiler: MdxCompiler::new(markdown, ComponentRegistry::builtin()),
        }
    }

    /// Replace the component set used for MDX bodies
    pub fn with_components(mut self, registry: ComponentRegistry) -> Self {
        let markdown = MarkdownRenderer::with_options(
            self.compiler.markdown().styles().clone(),
            &self.config.highlight.theme,
            self.config.highlight.enable,
        );
        self.compiler = MdxCompiler::new(markdown, registry);
        self
    }

    pub fn policy(&self) -> VisibilityPolicy {
        self.policy
    }

    /// Conventional path for a slug: `<content_dir>/<dir>/<slug>.<ext>`
    pub fn path_for(&self, kind: ContentKind, slug: &str) -> PathBuf {
        let collection = kind.collection(&self.config);
        self.content_dir
            .join(&collection.dir)
            .join(format!("{}.{}", slug, collection.extension))
    }

    /// Look up a visible document. Every failure is `None`.
    pub fn get_by_slug(&self, kind: ContentKind, slug: &str) -> Option<Document> {
        self.resolve(kind, slug).into_document()
    }

    /// Look up a document and report why it was not returned
    pub fn resolve(&self, kind: ContentKind, slug: &str) -> Resolution {
        if !is_safe_slug(slug) {
            tracing::debug!("Rejected unsafe {} slug {:?}", kind, slug);
            return Resolution::Missing;
        }

        let path = self.path_for(kind, slug);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No {} at {:?}", kind, path);
                return Resolution::Missing;
            }
            Err(e) => {
                tracing::warn!("Error reading {} {}: {}", kind, slug, e);
                return Resolution::Invalid(ContentError::io(path, e));
            }
        };

        let (front_matter, body) = match FrontMatter::parse(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Error reading {} {}: {}", kind, slug, e);
                return Resolution::Invalid(e);
            }
        };

        if !self.policy.allows(kind, front_matter.status) {
            tracing::debug!(
                "Hiding {} {} with status {}",
                kind,
                slug,
                front_matter.status.label()
            );
            return Resolution::Suppressed(front_matter.status);
        }

        let html = if self.config.render_bodies {
            match self.compile(kind, body) {
                Ok(html) => Some(html),
                Err(e) => {
                    tracing::warn!("Error compiling {} {}: {}", kind, slug, e);
                    return Resolution::CompileFailed(e);
                }
            }
        } else {
            None
        };

        Resolution::Found(Document {
            slug: slug.to_string(),
            kind,
            front_matter,
            content: body.to_string(),
            html,
            source: path,
        })
    }

    /// Compile a body according to the kind's format
    pub fn compile(&self, kind: ContentKind, body: &str) -> Result<String, CompileError> {
        match kind.body_format() {
            BodyFormat::Markdown => Ok(self.compiler.markdown().render(body)),
            BodyFormat::Mdx => self.compiler.compile(body),
        }
    }

    /// Slug index for a kind.
    ///
    /// An explicit `index` in the config is used as-is. Otherwise the
    /// collection directory is scanned for files with the kind's extension.
    pub fn slugs(&self, kind: ContentKind) -> Vec<String> {
        let collection = kind.collection(&self.config);
        if !collection.index.is_empty() {
            return collection.index.clone();
        }

        let dir = self.content_dir.join(&collection.dir);
        scan_slugs(&dir, &collection.extension)
    }

    /// All visible documents of a kind, in index order
    pub fn list(&self, kind: ContentKind) -> Vec<Document> {
        self.slugs(kind)
            .iter()
            .filter_map(|slug| self.get_by_slug(kind, slug))
            .collect()
    }

    /// Resolution of every indexed slug, for diagnostics
    pub fn resolve_all(&self, kind: ContentKind) -> Vec<(String, Resolution)> {
        self.slugs(kind)
            .into_iter()
            .map(|slug| {
                let resolution = self.resolve(kind, &slug);
                (slug, resolution)
            })
            .collect()
    }
}

/// Non-empty, ASCII alphanumerics, `-` and `_` only
pub fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn scan_slugs(dir: &Path, extension: &str) -> Vec<String> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut slugs: Vec<String> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext == extension)
                .unwrap_or(false)
        })
        .filter_map(|e| {
            e.path()
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
        })
        .filter(|slug| is_safe_slug(slug))
        .collect();

    slugs.sort();
    slugs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Status;

    const LIVE_STUDY: &str = r#"---
title: Android Studio Plugin
description: From 2 hours to 2 minutes
status: live
category: Growth Story
technologies: [Kotlin, IntelliJ Platform]
timeline: 6 weeks
team_size: "4"
metrics:
  - label: Active users
    value: "212"
    description: After launch
---

## Problem

<MetricGrid columns={2}>
  <Metric label="Active users" value="212" />
  <Metric label="Adoption" value="25%" />
</MetricGrid>
"#;

    const DRAFT_STUDY: &str = "---\ntitle: Secret\nstatus: draft\n---\nWork in progress\n";

    fn site() -> (tempfile::TempDir, Folio) {
        let tmp = tempfile::tempdir().unwrap();
        let folio = Folio::new(tmp.path()).unwrap();
        fs::create_dir_all(folio.collection_dir(ContentKind::CaseStudy)).unwrap();
        fs::create_dir_all(folio.collection_dir(ContentKind::BlogPost)).unwrap();
        (tmp, folio)
    }

    fn write(folio: &Folio, kind: ContentKind, file: &str, content: &str) {
        fs::write(folio.collection_dir(kind).join(file), content).unwrap();
    }

    fn repo(folio: &Folio) -> ContentRepository {
        ContentRepository::with_policy(folio, VisibilityPolicy::default())
    }

    #[test]
    fn test_get_live_document() {
        let (_tmp, folio) = site();
        write(&folio, ContentKind::CaseStudy, "android-studio-plugin.mdx", LIVE_STUDY);

        let doc = repo(&folio)
            .get_by_slug(ContentKind::CaseStudy, "android-studio-plugin")
            .unwrap();
        assert_eq!(doc.slug, "android-studio-plugin");
        assert_eq!(doc.title(), "Android Studio Plugin");
        assert_eq!(doc.labels(), ["Kotlin", "IntelliJ Platform"]);
        assert_eq!(doc.front_matter.metrics[0].value, "212");
        assert!(doc.content.starts_with("## Problem"));

        let html = doc.html.unwrap();
        assert!(html.contains("Problem</h2>"));
        assert!(!html.contains("lg:grid-cols"));
        assert!(html.contains("md:grid-cols-2"));
    }

    #[test]
    fn test_missing_slug_is_none() {
        let (_tmp, folio) = site();
        let repo = repo(&folio);
        assert!(repo.get_by_slug(ContentKind::CaseStudy, "nope").is_none());
        assert!(matches!(
            repo.resolve(ContentKind::BlogPost, "nope"),
            Resolution::Missing
        ));
    }

    #[test]
    fn test_unsafe_slug_is_missing() {
        let (_tmp, folio) = site();
        write(&folio, ContentKind::CaseStudy, "real.mdx", LIVE_STUDY);
        let repo = repo(&folio);
        for slug in ["", "../case-studies/real", "real.mdx", "a/b", "real "] {
            assert!(matches!(
                repo.resolve(ContentKind::CaseStudy, slug),
                Resolution::Missing
            ));
        }
    }

    #[test]
    fn test_draft_needs_flag() {
        let (_tmp, folio) = site();
        write(&folio, ContentKind::CaseStudy, "secret.mdx", DRAFT_STUDY);

        let hidden = repo(&folio);
        assert!(hidden.get_by_slug(ContentKind::CaseStudy, "secret").is_none());
        assert!(matches!(
            hidden.resolve(ContentKind::CaseStudy, "secret"),
            Resolution::Suppressed(Status::Draft)
        ));

        let mut policy = VisibilityPolicy::default();
        policy.set(ContentKind::CaseStudy, true);
        let shown = ContentRepository::with_policy(&folio, policy);
        let doc = shown.get_by_slug(ContentKind::CaseStudy, "secret").unwrap();
        assert_eq!(doc.status(), Status::Draft);

        // The case study toggle does not unlock blog drafts
        write(&folio, ContentKind::BlogPost, "secret.mdx", DRAFT_STUDY);
        assert!(shown.get_by_slug(ContentKind::BlogPost, "secret").is_none());
    }

    #[test]
    fn test_malformed_frontmatter_is_none() {
        let (_tmp, folio) = site();
        write(
            &folio,
            ContentKind::BlogPost,
            "broken.mdx",
            "---\ntitle: [oops\nstatus: live\n---\nBody\n",
        );
        let repo = repo(&folio);
        assert!(repo.get_by_slug(ContentKind::BlogPost, "broken").is_none());
        assert!(matches!(
            repo.resolve(ContentKind::BlogPost, "broken"),
            Resolution::Invalid(ContentError::FrontMatter(_))
        ));
    }

    #[test]
    fn test_compile_failure_is_none() {
        let (_tmp, folio) = site();
        write(
            &folio,
            ContentKind::CaseStudy,
            "chart.mdx",
            "---\ntitle: Chart\nstatus: live\n---\n<Chart />\n",
        );
        let repo = repo(&folio);
        assert!(repo.get_by_slug(ContentKind::CaseStudy, "chart").is_none());
        assert!(matches!(
            repo.resolve(ContentKind::CaseStudy, "chart"),
            Resolution::CompileFailed(CompileError::UnknownComponent(_))
        ));
    }

    #[test]
    fn test_blog_bodies_are_plain_markdown() {
        let (_tmp, folio) = site();
        write(
            &folio,
            ContentKind::BlogPost,
            "hello.mdx",
            "---\ntitle: Hello\nstatus: published\npublishedAt: 2024-03-01\ntags: [Leadership]\n---\nUnknown <Chart /> stays raw.\n",
        );
        let doc = repo(&folio)
            .get_by_slug(ContentKind::BlogPost, "hello")
            .unwrap();
        assert_eq!(doc.labels(), ["Leadership"]);
        assert!(doc.html.unwrap().contains("<Chart />"));
    }

    #[test]
    fn test_render_bodies_disabled() {
        let (_tmp, folio) = site();
        let mut folio = folio;
        folio.config.render_bodies = false;
        write(
            &folio,
            ContentKind::CaseStudy,
            "chart.mdx",
            "---\ntitle: Chart\nstatus: live\n---\n<Chart />\n",
        );
        let doc = repo(&folio)
            .get_by_slug(ContentKind::CaseStudy, "chart")
            .unwrap();
        assert!(doc.html.is_none());
        assert_eq!(doc.content, "<Chart />\n");
    }

    #[test]
    fn test_list_scans_directory() {
        let (_tmp, folio) = site();
        write(&folio, ContentKind::CaseStudy, "b-study.mdx", LIVE_STUDY);
        write(&folio, ContentKind::CaseStudy, "a-study.mdx", LIVE_STUDY);
        write(&folio, ContentKind::CaseStudy, "draft.mdx", DRAFT_STUDY);
        write(&folio, ContentKind::CaseStudy, "notes.txt", LIVE_STUDY);
        fs::create_dir_all(folio.collection_dir(ContentKind::CaseStudy).join("nested.mdx")).unwrap();

        let repo = repo(&folio);
        assert_eq!(
            repo.slugs(ContentKind::CaseStudy),
            vec!["a-study", "b-study", "draft"]
        );
        let slugs: Vec<String> = repo
            .list(ContentKind::CaseStudy)
            .into_iter()
            .map(|d| d.slug)
            .collect();
        assert_eq!(slugs, vec!["a-study", "b-study"]);
    }

    #[test]
    fn test_list_follows_configured_index() {
        let (_tmp, folio) = site();
        let mut folio = folio;
        folio.config.case_studies.index = vec![
            "adas-simulator".to_string(),
            "android-studio-plugin".to_string(),
            "documentation-ai-assistant".to_string(),
        ];
        write(&folio, ContentKind::CaseStudy, "documentation-ai-assistant.mdx", LIVE_STUDY);
        write(&folio, ContentKind::CaseStudy, "adas-simulator.mdx", LIVE_STUDY);
        write(&folio, ContentKind::CaseStudy, "unlisted.mdx", LIVE_STUDY);

        let repo = repo(&folio);
        let docs = repo.list(ContentKind::CaseStudy);
        assert!(docs.len() <= repo.slugs(ContentKind::CaseStudy).len());
        let slugs: Vec<&str> = docs.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, vec!["adas-simulator", "documentation-ai-assistant"]);
    }

    #[test]
    fn test_list_missing_directory_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let folio = Folio::new(tmp.path()).unwrap();
        assert!(repo(&folio).list(ContentKind::BlogPost).is_empty());
    }

    #[test]
    fn test_resolve_all_reports_each_slug() {
        let (_tmp, folio) = site();
        write(&folio, ContentKind::CaseStudy, "live.mdx", LIVE_STUDY);
        write(&folio, ContentKind::CaseStudy, "draft.mdx", DRAFT_STUDY);

        let report = repo(&folio).resolve_all(ContentKind::CaseStudy);
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].0, "draft");
        assert_eq!(report[0].1.describe(), "hidden (draft)");
        assert!(report[1].1.is_found());
    }

    #[test]
    fn test_custom_components() {
        let (_tmp, folio) = site();
        write(
            &folio,
            ContentKind::CaseStudy,
            "quote.mdx",
            "---\ntitle: Q\nstatus: live\n---\n<Quote>Ship it</Quote>\n",
        );
        let registry = ComponentRegistry::builtin().with(
            "Quote",
            |_: &crate::content::mdx::Props, children: &str| -> Result<String, CompileError> {
                Ok(format!("<q>{}</q>", children))
            },
        );
        let repo = repo(&folio).with_components(registry);
        let doc = repo.get_by_slug(ContentKind::CaseStudy, "quote").unwrap();
        assert_eq!(doc.html.as_deref(), Some("<q>Ship it</q>"));
    }
}
