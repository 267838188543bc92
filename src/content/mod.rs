//! Content module - documents, front-matter, visibility and body compilation

mod document;
mod error;
mod frontmatter;
mod kind;
pub mod markdown;
pub mod mdx;
pub mod repository;
mod visibility;

pub use document::{Document, Resolution};
pub use error::{CompileError, ContentError};
pub use frontmatter::{FrontMatter, Metric, Status};
pub use kind::{BodyFormat, ContentKind};
pub use markdown::{ElementKind, ElementStyles, MarkdownRenderer};
pub use mdx::{ComponentRegistry, MdxCompiler};
pub use repository::ContentRepository;
pub use visibility::{is_visible, VisibilityPolicy};
