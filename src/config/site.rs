//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub url: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,

    // Writing
    /// Compile document bodies to HTML when resolving them
    pub render_bodies: bool,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Collections
    #[serde(default = "CollectionConfig::blog")]
    pub blog: CollectionConfig,
    #[serde(default = "CollectionConfig::case_studies")]
    pub case_studies: CollectionConfig,

    // Contact endpoint
    #[serde(default)]
    pub contact: ContactConfig,

    // Server
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            url: "http://localhost:3000".to_string(),

            content_dir: "src/content".to_string(),
            public_dir: "public".to_string(),

            render_bodies: true,
            highlight: HighlightConfig::default(),

            blog: CollectionConfig::blog(),
            case_studies: CollectionConfig::case_studies(),

            contact: ContactConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Settings for one collection of documents (blog posts or case studies)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Directory relative to `content_dir`
    pub dir: String,
    /// File extension without the leading dot
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Explicit slug order. Empty means scan the directory.
    #[serde(default)]
    pub index: Vec<String>,
    /// Expose draft documents
    #[serde(default)]
    pub show_drafts: bool,
}

fn default_extension() -> String {
    "mdx".to_string()
}

impl CollectionConfig {
    pub fn blog() -> Self {
        Self {
            dir: "blog".to_string(),
            extension: default_extension(),
            index: Vec::new(),
            show_drafts: false,
        }
    }

    pub fn case_studies() -> Self {
        Self {
            dir: "case-studies".to_string(),
            extension: default_extension(),
            index: Vec::new(),
            show_drafts: false,
        }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

/// Contact form limits and rate limiting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub window_secs: u64,
    pub max_requests: u32,
    pub max_name_len: usize,
    pub max_email_len: usize,
    pub max_company_len: usize,
    pub max_message_len: usize,
    pub spam_keywords: Vec<String>,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            window_secs: 15 * 60,
            max_requests: 5,
            max_name_len: 100,
            max_email_len: 255,
            max_company_len: 100,
            max_message_len: 2000,
            spam_keywords: ["crypto", "bitcoin", "investment", "loan", "casino"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// HTTP server defaults, overridable from the command line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 3000,
        }
    }
}
