//! Markdown rendering with per-element styling and syntax highlighting

use lazy_static::lazy_static;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use std::collections::HashMap;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

lazy_static! {
    static ref SYNTAX_SET: SyntaxSet = SyntaxSet::load_defaults_newlines();
    static ref THEME_SET: ThemeSet = ThemeSet::load_defaults();
}

/// Markdown elements that can carry a substituted style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Paragraph,
    UnorderedList,
    OrderedList,
    ListItem,
    Strong,
    Emphasis,
    InlineCode,
    CodeBlock,
    BlockQuote,
    Rule,
}

impl ElementKind {
    fn tag_name(self) -> &'static str {
        match self {
            ElementKind::Heading1 => "h1",
            ElementKind::Heading2 => "h2",
            ElementKind::Heading3 => "h3",
            ElementKind::Heading4 => "h4",
            ElementKind::Paragraph => "p",
            ElementKind::UnorderedList => "ul",
            ElementKind::OrderedList => "ol",
            ElementKind::ListItem => "li",
            ElementKind::Strong => "strong",
            ElementKind::Emphasis => "em",
            ElementKind::InlineCode => "code",
            ElementKind::CodeBlock => "pre",
            ElementKind::BlockQuote => "blockquote",
            ElementKind::Rule => "hr",
        }
    }

    fn is_block(self) -> bool {
        !matches!(
            self,
            ElementKind::Strong | ElementKind::Emphasis | ElementKind::InlineCode
        )
    }

    /// Elements whose children start on their own line
    fn is_container(self) -> bool {
        matches!(
            self,
            ElementKind::UnorderedList | ElementKind::OrderedList | ElementKind::BlockQuote
        )
    }
}

/// Mapping from element kind to the class attribute it renders with.
/// Elements without an entry fall back to plain HTML.
#[derive(Debug, Clone, Default)]
pub struct ElementStyles {
    classes: HashMap<ElementKind, String>,
}

impl ElementStyles {
    /// No substitutions
    pub fn plain() -> Self {
        Self::default()
    }

    /// The site's article typography
    pub fn portfolio() -> Self {
        Self::plain()
            .with(ElementKind::Heading1, "text-3xl font-bold text-gray-900 mt-8 mb-4")
            .with(ElementKind::Heading2, "text-2xl font-semibold text-gray-900 mt-6 mb-3")
            .with(ElementKind::Heading3, "text-xl font-semibold text-gray-900 mt-4 mb-2")
            .with(ElementKind::Heading4, "text-lg font-semibold text-gray-900 mt-3 mb-2")
            .with(ElementKind::Paragraph, "text-gray-700 mb-4 leading-relaxed")
            .with(
                ElementKind::UnorderedList,
                "list-disc list-inside mb-4 space-y-2 text-gray-700",
            )
            .with(
                ElementKind::OrderedList,
                "list-decimal list-inside mb-4 space-y-2 text-gray-700",
            )
            .with(ElementKind::ListItem, "text-gray-700")
            .with(ElementKind::Strong, "font-semibold text-gray-900")
            .with(ElementKind::Emphasis, "italic text-gray-700")
            .with(
                ElementKind::InlineCode,
                "bg-gray-100 text-gray-900 px-1 py-0.5 rounded text-sm",
            )
            .with(
                ElementKind::CodeBlock,
                "bg-gray-900 text-gray-100 p-4 rounded-lg overflow-x-auto my-4",
            )
            .with(
                ElementKind::BlockQuote,
                "border-l-4 border-blue-200 bg-blue-50 pl-4 py-2 my-4 italic text-blue-900",
            )
            .with(ElementKind::Rule, "border-gray-200 my-8")
    }

    pub fn with(mut self, kind: ElementKind, class: impl Into<String>) -> Self {
        self.classes.insert(kind, class.into());
        self
    }

    pub fn class(&self, kind: ElementKind) -> Option<&str> {
        self.classes.get(&kind).map(String::as_str)
    }

    /// Opening tag for `kind`, or None when the element is not styled
    fn open(&self, kind: ElementKind, extra_attrs: &str) -> Option<String> {
        let class = self.class(kind)?;
        Some(format!(
            r#"<{}{} class="{}">"#,
            kind.tag_name(),
            extra_attrs,
            html_escape(class)
        ))
    }
}

/// Markdown renderer with element styles and syntax highlighting
pub struct MarkdownRenderer {
    styles: ElementStyles,
    theme_name: String,
    highlight: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer with the portfolio styles
    pub fn new() -> Self {
        Self::with_options(ElementStyles::portfolio(), "base16-ocean.dark", true)
    }

    /// Create with custom settings
    pub fn with_options(styles: ElementStyles, theme: &str, highlight: bool) -> Self {
        Self {
            styles,
            theme_name: theme.to_string(),
            highlight,
        }
    }

    pub fn styles(&self) -> &ElementStyles {
        &self.styles
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        // YAML metadata blocks are handled separately in FrontMatter::parse()
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        // Closing tag for every open element; None means pass the End through
        let mut closers: Vec<Option<String>> = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in parser {
            if let Some((lang, buf)) = code_block.as_mut() {
                match event {
                    Event::End(TagEnd::CodeBlock) => {
                        let rendered = self.render_code_block(buf, lang.as_deref());
                        events.push(Event::Html(CowStr::from(rendered)));
                        code_block = None;
                    }
                    Event::Text(text) => buf.push_str(&text),
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(|s| s.to_string()),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::Start(tag) => {
                    let styled = self.open_tag(&tag);
                    match styled {
                        Some((open, close)) => {
                            events.push(Event::Html(CowStr::from(open)));
                            closers.push(Some(close));
                        }
                        None => {
                            events.push(Event::Start(tag));
                            closers.push(None);
                        }
                    }
                }
                Event::End(end) => match closers.pop().flatten() {
                    Some(close) => events.push(Event::Html(CowStr::from(close))),
                    None => events.push(Event::End(end)),
                },
                Event::Code(code) => match self.styles.open(ElementKind::InlineCode, "") {
                    Some(open) => {
                        let rendered = format!("{}{}</code>", open, html_escape(&code));
                        events.push(Event::InlineHtml(CowStr::from(rendered)));
                    }
                    None => events.push(Event::Code(code)),
                },
                Event::Rule => match self.styles.class(ElementKind::Rule) {
                    Some(class) => {
                        let rendered = format!("<hr class=\"{}\" />\n", html_escape(class));
                        events.push(Event::Html(CowStr::from(rendered)));
                    }
                    None => events.push(Event::Rule),
                },
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Styled replacement for a start tag: (opening html, closing html)
    fn open_tag(&self, tag: &Tag) -> Option<(String, String)> {
        let (kind, attrs) = match tag {
            Tag::Heading { level, id, .. } => {
                let kind = match level {
                    HeadingLevel::H1 => ElementKind::Heading1,
                    HeadingLevel::H2 => ElementKind::Heading2,
                    HeadingLevel::H3 => ElementKind::Heading3,
                    HeadingLevel::H4 => ElementKind::Heading4,
                    _ => return None,
                };
                let attrs = id
                    .as_ref()
                    .map(|id| format!(r#" id="{}""#, html_escape(id)))
                    .unwrap_or_default();
                (kind, attrs)
            }
            Tag::Paragraph => (ElementKind::Paragraph, String::new()),
            Tag::List(None) => (ElementKind::UnorderedList, String::new()),
            Tag::List(Some(start)) => {
                let attrs = if *start == 1 {
                    String::new()
                } else {
                    format!(r#" start="{}""#, start)
                };
                (ElementKind::OrderedList, attrs)
            }
            Tag::Item => (ElementKind::ListItem, String::new()),
            Tag::Strong => (ElementKind::Strong, String::new()),
            Tag::Emphasis => (ElementKind::Emphasis, String::new()),
            Tag::BlockQuote(_) => (ElementKind::BlockQuote, String::new()),
            _ => return None,
        };

        let open = self.styles.open(kind, &attrs)?;
        let open = if kind.is_container() {
            format!("{}\n", open)
        } else {
            open
        };
        let close = if kind.is_block() {
            format!("</{}>\n", kind.tag_name())
        } else {
            format!("</{}>", kind.tag_name())
        };
        Some((open, close))
    }

    /// Highlight a fenced code block, or emit it escaped
    fn render_code_block(&self, code: &str, lang: Option<&str>) -> String {
        let pre_class = self
            .styles
            .class(ElementKind::CodeBlock)
            .map(|c| format!(r#" class="{}""#, html_escape(c)))
            .unwrap_or_default();

        if let (true, Some(lang)) = (self.highlight, lang) {
            let syntax = SYNTAX_SET
                .find_syntax_by_token(lang)
                .or_else(|| SYNTAX_SET.find_syntax_by_extension(lang));
            let theme = THEME_SET
                .themes
                .get(&self.theme_name)
                .or_else(|| THEME_SET.themes.values().next());

            if let (Some(syntax), Some(theme)) = (syntax, theme) {
                match highlighted_html_for_string(code, &SYNTAX_SET, syntax, theme) {
                    Ok(highlighted) => {
                        return format!(
                            r#"<figure class="highlight {}">{}</figure>"#,
                            html_escape(lang),
                            highlighted
                        );
                    }
                    Err(e) => tracing::debug!("Highlighting {} failed: {}", lang, e),
                }
            }
        }

        let code_class = lang
            .map(|l| format!(r#" class="language-{}""#, html_escape(l)))
            .unwrap_or_default();
        format!(
            "<pre{}><code{}>{}</code></pre>\n",
            pre_class,
            code_class,
            html_escape(code)
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Simple HTML escaping
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> MarkdownRenderer {
        MarkdownRenderer::with_options(ElementStyles::plain(), "base16-ocean.dark", false)
    }

    #[test]
    fn test_render_plain_markdown() {
        let html = plain().render("# Hello World\n\nThis is a test.");
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_styled_elements() {
        let html = MarkdownRenderer::new().render("## Results\n\nWe **shipped** it.\n\n- one\n- two\n");
        assert!(html.contains(r#"<h2 class="text-2xl font-semibold text-gray-900 mt-6 mb-3">Results</h2>"#));
        assert!(html.contains(r#"<strong class="font-semibold text-gray-900">shipped</strong>"#));
        assert!(html.contains(r#"<ul class="list-disc"#));
        assert!(html.contains(r#"<li class="text-gray-700">one</li>"#));
    }

    #[test]
    fn test_partial_styles_fall_back() {
        let styles = ElementStyles::plain().with(ElementKind::BlockQuote, "quote");
        let renderer = MarkdownRenderer::with_options(styles, "base16-ocean.dark", false);
        let html = renderer.render("> quoted\n\n*plain em*");
        assert!(html.contains(r#"<blockquote class="quote">"#));
        assert!(html.contains("</blockquote>"));
        assert!(html.contains("<em>plain em</em>"));
    }

    #[test]
    fn test_inline_code_and_rule() {
        let html = MarkdownRenderer::new().render("Use `cargo <run>`\n\n---\n");
        assert!(html.contains("cargo &lt;run&gt;</code>"));
        assert!(html.contains(r#"<code class="bg-gray-100"#));
        assert!(html.contains(r#"<hr class="border-gray-200 my-8" />"#));
    }

    #[test]
    fn test_code_block_without_highlighting() {
        let html = MarkdownRenderer::new().render("```unknown-lang\na < b\n```");
        assert!(html.contains(r#"<pre class="bg-gray-900"#));
        assert!(html.contains(r#"<code class="language-unknown-lang">a &lt; b"#));
    }

    #[test]
    fn test_code_block_highlighted() {
        let html = MarkdownRenderer::new().render("```rust\nfn main() {}\n```");
        assert!(html.contains(r#"<figure class="highlight rust">"#));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_ordered_list_start() {
        let html = plain().render("3. three\n4. four\n");
        assert!(html.contains("<ol start=\"3\">"));

        let styles = ElementStyles::plain().with(ElementKind::OrderedList, "steps");
        let renderer = MarkdownRenderer::with_options(styles, "base16-ocean.dark", false);
        let html = renderer.render("3. three\n4. four\n");
        assert!(html.contains(r#"<ol start="3" class="steps">"#));
        assert!(html.contains("</ol>"));
    }
}
