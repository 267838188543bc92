//! Document model

use serde::Serialize;
use std::path::PathBuf;

use super::error::{CompileError, ContentError};
use super::frontmatter::{FrontMatter, Status};
use super::kind::ContentKind;

/// A blog post or case study read from disk
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Filename stem, unique within its kind
    pub slug: String,

    pub kind: ContentKind,

    #[serde(rename = "frontmatter")]
    pub front_matter: FrontMatter,

    /// Raw body after the front-matter block
    pub content: String,

    /// Compiled body, when compilation is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    /// Full source file path
    #[serde(skip)]
    pub source: PathBuf,
}

impl Document {
    pub fn title(&self) -> &str {
        &self.front_matter.title
    }

    pub fn status(&self) -> Status {
        self.front_matter.status
    }

    /// Tags for blog posts, technologies for case studies
    pub fn labels(&self) -> &[String] {
        match self.kind {
            ContentKind::BlogPost => &self.front_matter.tags,
            ContentKind::CaseStudy => &self.front_matter.technologies,
        }
    }
}

/// Outcome of resolving a slug.
///
/// Callers at the page boundary only see found / not found through
/// [`Resolution::into_document`]; the other variants exist for diagnostics.
#[derive(Debug)]
pub enum Resolution {
    Found(Document),
    /// No file at the conventional path, or the slug is not filesystem-safe
    Missing,
    /// File exists but could not be read or parsed
    Invalid(ContentError),
    /// Parsed, but hidden by the visibility policy
    Suppressed(Status),
    /// Parsed and visible, but the body failed to compile
    CompileFailed(CompileError),
}

impl Resolution {
    pub fn into_document(self) -> Option<Document> {
        match self {
            Resolution::Found(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    /// Short label for listings
    pub fn describe(&self) -> String {
        match self {
            Resolution::Found(doc) => format!("found ({})", doc.status().label()),
            Resolution::Missing => "missing".to_string(),
            Resolution::Invalid(e) => format!("invalid: {}", e),
            Resolution::Suppressed(status) => format!("hidden ({})", status.label()),
            Resolution::CompileFailed(e) => format!("compile failed: {}", e),
        }
    }
}
