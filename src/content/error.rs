//! Error types for content loading and body compilation

use std::path::PathBuf;
use thiserror::Error;

/// Why a stored document could not be read
#[derive(Error, Debug)]
pub enum ContentError {
    /// Front-matter block is malformed
    #[error("Front-matter error: {0}")]
    FrontMatter(String),

    /// File exists but could not be read
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContentError {
    pub fn frontmatter(message: impl Into<String>) -> Self {
        Self::FrontMatter(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Why a body could not be compiled to HTML
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Unknown component <{0}>")]
    UnknownComponent(String),

    #[error("Unclosed component <{0}>")]
    Unclosed(String),

    #[error("Unexpected closing tag </{found}>, expected </{expected}>")]
    MismatchedClose { expected: String, found: String },

    #[error("Stray closing tag </{0}>")]
    StrayClose(String),

    #[error("Malformed attributes on <{component}>: {message}")]
    Attribute { component: String, message: String },

    #[error("Invalid value for `{prop}` on <{component}>: {message}")]
    Prop {
        component: String,
        prop: String,
        message: String,
    },
}

impl CompileError {
    pub fn prop(component: &str, prop: &str, message: impl Into<String>) -> Self {
        Self::Prop {
            component: component.to_string(),
            prop: prop.to_string(),
            message: message.into(),
        }
    }
}
