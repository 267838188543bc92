//! Front-matter parsing

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use super::error::ContentError;

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Scalars written without quotes (`team_size: 4`, `value: 212`) read as strings
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_scalar_string(deserializer)?.unwrap_or_default())
}

fn opt_scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct ScalarString;

    impl<'de> Visitor<'de> for ScalarString {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, number or boolean")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
            Ok(Some(value))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(ScalarString)
}

/// Publication status of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Draft,
    Live,
    Published,
    ComingSoon,
    InProgress,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Draft => "draft",
            Status::Live => "live",
            Status::Published => "published",
            Status::ComingSoon => "coming-soon",
            Status::InProgress => "in-progress",
            Status::Unknown => "unknown",
        }
    }
}

/// A headline number shown on a case study
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    #[serde(deserialize_with = "scalar_string")]
    pub value: String,
    #[serde(default)]
    pub description: String,
}

/// Front-matter shared by blog posts and case studies.
///
/// Kind-specific fields are optional: `published_at` belongs to blog posts,
/// `timeline`, `team_size` and `metrics` to case studies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: String,
    pub description: String,
    pub status: Status,
    pub category: String,
    #[serde(deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "string_or_vec")]
    pub technologies: Vec<String>,

    // Blog posts
    #[serde(
        rename = "publishedAt",
        deserialize_with = "opt_scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<String>,
    #[serde(
        rename = "readTime",
        deserialize_with = "opt_scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub read_time: Option<String>,

    // Case studies
    #[serde(deserialize_with = "opt_scalar_string", skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(deserialize_with = "opt_scalar_string", skip_serializing_if = "Option::is_none")]
    pub team_size: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<Metric>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, body)
    ///
    /// A file without a leading `---` block has default front-matter and the
    /// whole text as body. An opening delimiter without a closing one, or a
    /// block that is not valid YAML, is an error.
    pub fn parse(content: &str) -> Result<(Self, &str), ContentError> {
        let content = content.trim_start_matches('\u{feff}').trim_start();

        let Some(rest) = content.strip_prefix("---") else {
            return Ok((FrontMatter::default(), content));
        };
        let rest = rest.trim_start_matches([' ', '\t']);
        let rest = rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
            .ok_or_else(|| ContentError::frontmatter("opening delimiter must end its line"))?;

        let (yaml, body) = split_closing(rest)
            .ok_or_else(|| ContentError::frontmatter("missing closing `---` delimiter"))?;

        if yaml.trim().is_empty() {
            return Ok((FrontMatter::default(), body));
        }

        let fm = serde_yaml::from_str::<FrontMatter>(yaml)
            .map_err(|e| ContentError::frontmatter(e.to_string()))?;
        Ok((fm, body))
    }

    /// Parse the published date into a DateTime
    pub fn parse_published_at(&self) -> Option<DateTime<Local>> {
        self.published_at.as_ref().and_then(|s| parse_date_string(s))
    }
}

/// Find the closing `---` line. Returns (yaml, body).
fn split_closing(rest: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body.trim_start_matches(['\n', '\r'])));
        }
        offset += line.len();
    }
    None
}

/// Parse a date string in various formats
fn parse_date_string(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();

    // Try RFC 3339 / ISO 8601 first so offsets are honoured
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return dt.and_local_timezone(Local).earliest();
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y"] {
        if let Ok(d) = chrono::NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0)?.and_local_timezone(Local).earliest();
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_study_frontmatter() {
        let content = r#"---
title: ADAS Test Simulator
description: Simulation platform
status: live
category: Flagship Product
technologies:
  - Rust
  - Kubernetes
timeline: 18 months
team_size: "12"
metrics:
  - label: Safety coverage
    value: 85%
    description: Of regulated scenarios
---

## Context

Body text.
"#;

        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, "ADAS Test Simulator");
        assert_eq!(fm.status, Status::Live);
        assert_eq!(fm.technologies, vec!["Rust", "Kubernetes"]);
        assert_eq!(fm.timeline.as_deref(), Some("18 months"));
        assert_eq!(fm.team_size.as_deref(), Some("12"));
        assert_eq!(fm.metrics.len(), 1);
        assert_eq!(fm.metrics[0].value, "85%");
        assert!(body.starts_with("## Context"));
    }

    #[test]
    fn test_parse_blog_frontmatter() {
        let content = "---\ntitle: Hello\nstatus: published\npublishedAt: 2024-01-15\ntags: Leadership\nauthor: me\n---\nText\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.status, Status::Published);
        assert_eq!(fm.tags, vec!["Leadership"]);
        assert_eq!(fm.extra.get("author").and_then(|v| v.as_str()), Some("me"));
        assert_eq!(
            fm.parse_published_at().unwrap().format("%Y-%m-%d").to_string(),
            "2024-01-15"
        );
        assert_eq!(body, "Text\n");
    }

    #[test]
    fn test_unquoted_numbers_read_as_strings() {
        let content = "---\nteam_size: 4\nreadTime: 7\nmetrics:\n  - label: Users\n    value: 212\n---\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.team_size.as_deref(), Some("4"));
        assert_eq!(fm.read_time.as_deref(), Some("7"));
        assert_eq!(fm.metrics[0].value, "212");
    }

    #[test]
    fn test_status_variants() {
        let (fm, _) = FrontMatter::parse("---\nstatus: coming-soon\n---\n").unwrap();
        assert_eq!(fm.status, Status::ComingSoon);

        let (fm, _) = FrontMatter::parse("---\nstatus: archived\n---\n").unwrap();
        assert_eq!(fm.status, Status::Unknown);

        let (fm, _) = FrontMatter::parse("---\ntitle: No status\n---\n").unwrap();
        assert_eq!(fm.status, Status::Unknown);
    }

    #[test]
    fn test_no_frontmatter() {
        let (fm, body) = FrontMatter::parse("# Just a heading\n").unwrap();
        assert_eq!(fm.title, "");
        assert_eq!(body, "# Just a heading\n");
    }

    #[test]
    fn test_horizontal_rule_in_body_is_not_a_delimiter() {
        let content = "---\ntitle: Rules\n---\nAbove\n\n---\n\nBelow\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, "Rules");
        assert!(body.contains("Above"));
        assert!(body.contains("Below"));
    }

    #[test]
    fn test_unclosed_frontmatter_is_error() {
        let err = FrontMatter::parse("---\ntitle: Oops\n\nNo closing line").unwrap_err();
        assert!(err.to_string().contains("closing"));
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let content = "---\ntitle: [unterminated\n---\nBody\n";
        assert!(FrontMatter::parse(content).is_err());
    }

    #[test]
    fn test_crlf_line_endings() {
        let content = "---\r\ntitle: Windows\r\nstatus: live\r\n---\r\nBody\r\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, "Windows");
        assert_eq!(fm.status, Status::Live);
        assert_eq!(body, "Body\r\n");
    }
}
