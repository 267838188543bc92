//! Components that can be embedded in MDX bodies

use std::collections::HashMap;
use std::sync::Arc;

use super::parser::Props;
use crate::content::error::CompileError;
use crate::content::markdown::html_escape;

/// Render strategy for one component name.
///
/// `children` is the already-compiled HTML of the element's content.
pub trait Component: Send + Sync {
    fn render(&self, props: &Props, children: &str) -> Result<String, CompileError>;
}

impl<F> Component for F
where
    F: Fn(&Props, &str) -> Result<String, CompileError> + Send + Sync,
{
    fn render(&self, props: &Props, children: &str) -> Result<String, CompileError> {
        self(props, children)
    }
}

/// Mapping from component name to render strategy
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    components: HashMap<String, Arc<dyn Component>>,
}

impl ComponentRegistry {
    /// Empty registry; every component is unknown
    pub fn new() -> Self {
        Self::default()
    }

    /// The formatting components used by case studies
    pub fn builtin() -> Self {
        Self::new()
            .with("CalloutBox", CalloutBox)
            .with("MetricGrid", MetricGrid)
            .with("Metric", Metric)
            .with("TileList", TileList)
            .with("Tile", Tile)
            .with("TechStack", TechStack)
    }

    pub fn with(mut self, name: &str, component: impl Component + 'static) -> Self {
        self.register(name, component);
        self
    }

    /// Add or replace a component
    pub fn register(&mut self, name: &str, component: impl Component + 'static) {
        self.components.insert(name.to_string(), Arc::new(component));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Component>> {
        self.components.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.components.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.names())
            .finish()
    }
}

/// Join class fragments, skipping empty ones
fn classes(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn extra_class(props: &Props) -> Result<&str, CompileError> {
    Ok(props.str("className")?.unwrap_or(""))
}

/// Highlighted aside: `<CalloutBox type="warning" title="Heads up">`
pub struct CalloutBox;

impl Component for CalloutBox {
    fn render(&self, props: &Props, children: &str) -> Result<String, CompileError> {
        let kind = props.str("type")?.unwrap_or("info");
        let (container, icon, icon_color) = match kind {
            "info" => ("bg-blue-50 border-blue-200 text-blue-900", "info", "text-blue-600"),
            "warning" => (
                "bg-amber-50 border-amber-200 text-amber-900",
                "alert-triangle",
                "text-amber-600",
            ),
            "success" => (
                "bg-green-50 border-green-200 text-green-900",
                "check-circle",
                "text-green-600",
            ),
            "error" => ("bg-red-50 border-red-200 text-red-900", "x-circle", "text-red-600"),
            "tip" => (
                "bg-purple-50 border-purple-200 text-purple-900",
                "lightbulb",
                "text-purple-600",
            ),
            other => {
                return Err(CompileError::prop(
                    props.component(),
                    "type",
                    format!("unknown callout type `{}`", other),
                ))
            }
        };

        let title = match props.str("title")? {
            Some(t) if !t.is_empty() => {
                format!(r#"<div class="font-semibold mb-2">{}</div>"#, html_escape(t))
            }
            _ => String::new(),
        };

        Ok(format!(
            concat!(
                r#"<div class="{}" data-callout="{}">"#,
                r#"<div class="flex items-start gap-3">"#,
                r#"<span class="{}" data-icon="{}"></span>"#,
                r#"<div class="flex-1">{}<div class="text-sm leading-relaxed">{}</div></div>"#,
                "</div></div>\n"
            ),
            classes(&[
                "border rounded-lg p-4 my-6 not-prose",
                container,
                extra_class(props)?
            ]),
            kind,
            classes(&["w-5 h-5 mt-0.5 flex-shrink-0", icon_color]),
            icon,
            title,
            children
        ))
    }
}

/// Grid of `Metric` cards with 2, 3 or 4 columns
pub struct MetricGrid;

impl Component for MetricGrid {
    fn render(&self, props: &Props, children: &str) -> Result<String, CompileError> {
        let cols = match props.int("columns")?.unwrap_or(4) {
            2 => "grid-cols-1 md:grid-cols-2",
            3 => "grid-cols-1 md:grid-cols-2 lg:grid-cols-3",
            4 => "grid-cols-1 md:grid-cols-2 lg:grid-cols-4",
            n => {
                return Err(CompileError::prop(
                    props.component(),
                    "columns",
                    format!("expected 2, 3 or 4, got {}", n),
                ))
            }
        };
        Ok(format!(
            "<div class=\"{}\">{}</div>\n",
            classes(&["grid gap-6 my-8 not-prose", cols, extra_class(props)?]),
            children
        ))
    }
}

/// One headline number
pub struct Metric;

impl Component for Metric {
    fn render(&self, props: &Props, _children: &str) -> Result<String, CompileError> {
        let label = props.required_str("label")?;
        let value = props.required_str("value")?;
        let description = match props.str("description")? {
            Some(d) if !d.is_empty() => {
                format!(r#"<div class="text-sm text-gray-600">{}</div>"#, html_escape(d))
            }
            _ => String::new(),
        };
        Ok(format!(
            concat!(
                r#"<div class="{}">"#,
                r#"<div class="text-2xl font-bold text-blue-600 mb-2">{}</div>"#,
                r#"<div class="font-semibold text-gray-900 mb-1">{}</div>"#,
                "{}</div>"
            ),
            classes(&["bg-gray-50 rounded-lg p-6 text-center", extra_class(props)?]),
            html_escape(value),
            html_escape(label),
            description
        ))
    }
}

/// Grid of `Tile`s with 1 to 5 columns
pub struct TileList;

impl Component for TileList {
    fn render(&self, props: &Props, children: &str) -> Result<String, CompileError> {
        let cols = match props.int("columns")?.unwrap_or(3) {
            1 => "grid-cols-1",
            2 => "grid-cols-1 md:grid-cols-2",
            3 => "grid-cols-1 md:grid-cols-2 lg:grid-cols-3",
            4 => "grid-cols-1 md:grid-cols-2 lg:grid-cols-4",
            5 => "grid-cols-1 md:grid-cols-2 lg:grid-cols-5",
            n => {
                return Err(CompileError::prop(
                    props.component(),
                    "columns",
                    format!("expected 1 to 5, got {}", n),
                ))
            }
        };
        Ok(format!(
            "<div class=\"{}\">{}</div>\n",
            classes(&["grid gap-4 my-6 not-prose", cols, extra_class(props)?]),
            children
        ))
    }
}

pub struct Tile;

impl Component for Tile {
    fn render(&self, _props: &Props, children: &str) -> Result<String, CompileError> {
        Ok(format!(
            concat!(
                r#"<div class="bg-gray-50 border border-gray-200 rounded-lg p-4 hover:shadow-sm transition-shadow">"#,
                r#"<div class="text-sm font-normal text-gray-900">{}</div></div>"#
            ),
            children
        ))
    }
}

/// Technology badges or tiles: `<TechStack technologies={["Rust"]} variant="tiles" />`
pub struct TechStack;

impl Component for TechStack {
    fn render(&self, props: &Props, children: &str) -> Result<String, CompileError> {
        let technologies = props.list("technologies")?.unwrap_or(&[]);
        let title = props.str("title")?.unwrap_or("Technologies Used");
        let variant = props.str("variant")?.unwrap_or("badges");

        let (heading_class, list_class, item_class, note_class) = match variant {
            "badges" => (
                "text-lg font-semibold text-gray-900 mb-3",
                "flex flex-wrap gap-2",
                "badge badge-secondary",
                "mt-3 text-sm text-gray-600",
            ),
            "tiles" => (
                "text-lg font-semibold text-gray-900 mb-4",
                "grid grid-cols-2 md:grid-cols-3 lg:grid-cols-4 gap-3",
                "bg-gray-50 border border-gray-200 rounded-lg p-3 text-center text-sm font-medium text-gray-900",
                "mt-4 text-sm text-gray-600",
            ),
            other => {
                return Err(CompileError::prop(
                    props.component(),
                    "variant",
                    format!("expected `badges` or `tiles`, got `{}`", other),
                ))
            }
        };

        let mut html = format!(
            "<div class=\"{}\">",
            classes(&["my-6 not-prose", extra_class(props)?])
        );
        if !title.is_empty() {
            html.push_str(&format!(
                r#"<h4 class="{}">{}</h4>"#,
                heading_class,
                html_escape(title)
            ));
        }
        html.push_str(&format!(r#"<div class="{}">"#, list_class));
        for tech in technologies {
            html.push_str(&format!(
                r#"<span class="{}">{}</span>"#,
                item_class,
                html_escape(tech)
            ));
        }
        html.push_str("</div>");
        if !children.trim().is_empty() {
            html.push_str(&format!(r#"<div class="{}">{}</div>"#, note_class, children));
        }
        html.push_str("</div>\n");
        Ok(html)
    }
}
