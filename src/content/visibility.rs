//! Visibility policy: which statuses are exposed

use super::frontmatter::Status;
use super::kind::ContentKind;
use crate::config::SiteConfig;

/// Decide whether a document with `status` is exposed.
///
/// Live and published documents are always visible. Drafts are visible only
/// when `show_drafts` is set. Everything else is hidden.
pub fn is_visible(status: Status, show_drafts: bool) -> bool {
    match status {
        Status::Live | Status::Published => true,
        Status::Draft => show_drafts,
        Status::ComingSoon | Status::InProgress | Status::Unknown => false,
    }
}

/// Per-kind draft toggles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilityPolicy {
    pub show_draft_blog_posts: bool,
    pub show_draft_case_studies: bool,
}

impl VisibilityPolicy {
    /// Toggles from the config file only
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            show_draft_blog_posts: config.blog.show_drafts,
            show_draft_case_studies: config.case_studies.show_drafts,
        }
    }

    /// Config toggles, overridden by the draft environment variables when set
    pub fn from_env(config: &SiteConfig) -> Self {
        Self::from_lookup(config, |key| std::env::var(key).ok())
    }

    fn from_lookup(config: &SiteConfig, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut policy = Self::from_config(config);
        for kind in ContentKind::ALL {
            if let Some(value) = lookup(kind.draft_env_var()) {
                let enabled = is_truthy(&value);
                tracing::debug!("{}={} (drafts {})", kind.draft_env_var(), value, enabled);
                policy.set(kind, enabled);
            }
        }
        policy
    }

    pub fn show_drafts(&self, kind: ContentKind) -> bool {
        match kind {
            ContentKind::BlogPost => self.show_draft_blog_posts,
            ContentKind::CaseStudy => self.show_draft_case_studies,
        }
    }

    pub fn set(&mut self, kind: ContentKind, enabled: bool) {
        match kind {
            ContentKind::BlogPost => self.show_draft_blog_posts = enabled,
            ContentKind::CaseStudy => self.show_draft_case_studies = enabled,
        }
    }

    pub fn allows(&self, kind: ContentKind, status: Status) -> bool {
        is_visible(status, self.show_drafts(kind))
    }
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("true") || value == "1"
}
