//! MDX compilation: Markdown with embedded components

mod components;
mod parser;

pub use components::{Component, ComponentRegistry};
pub use parser::{parse, Element, Node, PropValue, Props};

use super::error::CompileError;
use super::markdown::MarkdownRenderer;

/// Compiles MDX bodies to HTML, substituting registered components
pub struct MdxCompiler {
    markdown: MarkdownRenderer,
    registry: ComponentRegistry,
}

impl MdxCompiler {
    pub fn new(markdown: MarkdownRenderer, registry: ComponentRegistry) -> Self {
        Self { markdown, registry }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn markdown(&self) -> &MarkdownRenderer {
        &self.markdown
    }

    /// Compile an MDX body to HTML
    pub fn compile(&self, source: &str) -> Result<String, CompileError> {
        let nodes = parse(source)?;
        self.render_nodes(&nodes)
    }

    fn render_nodes(&self, nodes: &[Node]) -> Result<String, CompileError> {
        let mut html = String::new();
        for node in nodes {
            match node {
                Node::Markdown(text) => {
                    if !text.trim().is_empty() {
                        html.push_str(&self.markdown.render(&dedent(text)));
                    }
                }
                Node::Element(element) => html.push_str(&self.render_element(element)?),
            }
        }
        Ok(html)
    }

    fn render_element(&self, element: &Element) -> Result<String, CompileError> {
        let component = self
            .registry
            .get(&element.name)
            .ok_or_else(|| CompileError::UnknownComponent(element.name.clone()))?;

        let children = match element.children.as_slice() {
            // Single-line text content renders inline, without a paragraph
            [Node::Markdown(text)] if !text.trim().contains('\n') => {
                strip_paragraph(&self.markdown.render(text.trim()))
            }
            children => self.render_nodes(children)?,
        };

        component.render(&element.props, &children)
    }
}

impl Default for MdxCompiler {
    fn default() -> Self {
        Self::new(MarkdownRenderer::new(), ComponentRegistry::builtin())
    }
}

/// Remove the indentation shared by all non-blank lines
fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);
    if indent == 0 {
        return text.to_string();
    }

    text.split_inclusive('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.trim_start_matches([' ', '\t'])
            } else {
                &line[indent..]
            }
        })
        .collect()
}

/// Unwrap `<p ...>inner</p>` when the html is exactly one paragraph
fn strip_paragraph(html: &str) -> String {
    let trimmed = html.trim();
    let is_single = trimmed.starts_with("<p")
        && matches!(trimmed.as_bytes().get(2), Some(b'>') | Some(b' '))
        && trimmed.ends_with("</p>")
        && trimmed.matches("</p>").count() == 1;
    if !is_single {
        return trimmed.to_string();
    }
    match trimmed.find('>') {
        Some(open_end) => trimmed[open_end + 1..trimmed.len() - 4].to_string(),
        None => trimmed.to_string(),
    }
}
