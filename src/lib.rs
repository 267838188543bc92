//! folio: content server for a portfolio site
//!
//! Blog posts and case studies live on disk as MDX files with YAML
//! front-matter. This crate reads them on demand, applies the draft
//! visibility policy, compiles bodies to HTML, and serves them over HTTP
//! next to a rate-limited contact endpoint.

pub mod commands;
pub mod config;
pub mod contact;
pub mod content;
pub mod server;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The site rooted at a base directory
#[derive(Debug, Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Root of the content collections
    pub content_dir: PathBuf,
    /// Static files served as the fallback route
    pub public_dir: PathBuf,
}

impl Folio {
    /// Create a new instance from a directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            tracing::debug!("Loading config from {:?}", config_path);
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create from an already-built configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            content_dir,
            public_dir,
        }
    }

    /// Directory holding documents of `kind`
    pub fn collection_dir(&self, kind: content::ContentKind) -> PathBuf {
        self.content_dir.join(&kind.collection(&self.config).dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_new_without_config() {
        let tmp = tempfile::tempdir().unwrap();
        let folio = Folio::new(tmp.path()).unwrap();
        assert_eq!(folio.content_dir, tmp.path().join("src/content"));
        assert_eq!(
            folio.collection_dir(content::ContentKind::CaseStudy),
            tmp.path().join("src/content/case-studies")
        );
    }

    #[test]
    fn test_new_with_config() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("_config.yml"),
            "content_dir: content\nblog:\n  dir: posts\n",
        )
        .unwrap();
        let folio = Folio::new(tmp.path()).unwrap();
        assert_eq!(
            folio.collection_dir(content::ContentKind::BlogPost),
            tmp.path().join("content/posts")
        );
    }

    #[test]
    fn test_broken_config_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("_config.yml"), "blog: [not, a, map]\n").unwrap();
        assert!(Folio::new(tmp.path()).is_err());
    }
}
