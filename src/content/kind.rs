//! Content kinds and their storage conventions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::{CollectionConfig, SiteConfig};

/// The two document collections served by the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    BlogPost,
    CaseStudy,
}

impl ContentKind {
    pub const ALL: [ContentKind; 2] = [ContentKind::BlogPost, ContentKind::CaseStudy];

    /// Environment variable that unlocks draft documents of this kind
    pub fn draft_env_var(self) -> &'static str {
        match self {
            ContentKind::BlogPost => "SHOW_DRAFT_BLOG_POSTS",
            ContentKind::CaseStudy => "SHOW_DRAFT_CASE_STUDIES",
        }
    }

    /// Collection settings for this kind
    pub fn collection(self, config: &SiteConfig) -> &CollectionConfig {
        match self {
            ContentKind::BlogPost => &config.blog,
            ContentKind::CaseStudy => &config.case_studies,
        }
    }

    /// Case studies may embed components; blog posts are plain Markdown
    pub fn body_format(self) -> BodyFormat {
        match self {
            ContentKind::BlogPost => BodyFormat::Markdown,
            ContentKind::CaseStudy => BodyFormat::Mdx,
        }
    }

    /// URL segment used by the HTTP API
    pub fn route(self) -> &'static str {
        match self {
            ContentKind::BlogPost => "blog",
            ContentKind::CaseStudy => "case-studies",
        }
    }
}

/// How a document body is compiled to HTML
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Markdown,
    Mdx,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::BlogPost => write!(f, "blog post"),
            ContentKind::CaseStudy => write!(f, "case study"),
        }
    }
}

impl FromStr for ContentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blog" | "post" | "posts" | "blog-post" => Ok(ContentKind::BlogPost),
            "case-study" | "case-studies" | "study" | "studies" => Ok(ContentKind::CaseStudy),
            _ => anyhow::bail!("Unknown type: {}. Available: blog, case-studies", s),
        }
    }
}
