//! Splits an MDX body into Markdown runs and component elements

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

use crate::content::error::CompileError;

lazy_static! {
    static ref OPEN_TAG: Regex = Regex::new(r"^<([A-Z][A-Za-z0-9]*)").unwrap();
    static ref CLOSE_TAG: Regex = Regex::new(r"^</([A-Z][A-Za-z0-9]*)\s*>").unwrap();
    static ref ATTR_NAME: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*").unwrap();
}

/// A parsed piece of an MDX body
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Markdown(String),
    Element(Element),
}

/// A component invocation such as `<Metric label="Users" value="212" />`
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub props: Props,
    pub children: Vec<Node>,
}

/// Attribute value on a component
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Str(String),
    Number(f64),
    Bool(bool),
    List(Vec<String>),
}

/// Attributes of one element, with typed accessors
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Props {
    component: String,
    values: BTreeMap<String, PropValue>,
}

impl Props {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: &str, value: PropValue) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.values.get(name)
    }

    /// String prop; absent is None, other types are an error
    pub fn str(&self, name: &str) -> Result<Option<&str>, CompileError> {
        match self.values.get(name) {
            None => Ok(None),
            Some(PropValue::Str(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(CompileError::prop(&self.component, name, "expected a string")),
        }
    }

    pub fn required_str(&self, name: &str) -> Result<&str, CompileError> {
        self.str(name)?
            .ok_or_else(|| CompileError::prop(&self.component, name, "is required"))
    }

    /// Whole-number prop
    pub fn int(&self, name: &str) -> Result<Option<i64>, CompileError> {
        match self.values.get(name) {
            None => Ok(None),
            Some(PropValue::Number(n)) if n.fract() == 0.0 => Ok(Some(*n as i64)),
            Some(PropValue::Str(s)) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| CompileError::prop(&self.component, name, "expected an integer")),
            Some(_) => Err(CompileError::prop(&self.component, name, "expected an integer")),
        }
    }

    pub fn list(&self, name: &str) -> Result<Option<&[String]>, CompileError> {
        match self.values.get(name) {
            None => Ok(None),
            Some(PropValue::List(items)) => Ok(Some(items.as_slice())),
            Some(_) => Err(CompileError::prop(&self.component, name, "expected a list of strings")),
        }
    }
}

/// Parse an MDX body into nodes.
///
/// Component tags inside fenced code blocks and inline code spans are left
/// as Markdown.
pub fn parse(source: &str) -> Result<Vec<Node>, CompileError> {
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Vec<Node> = Vec::new();
    let mut text = String::new();

    let mut pos = 0;
    let mut in_fence: Option<String> = None;

    while pos < source.len() {
        let rest = &source[pos..];
        let at_line_start = pos == 0 || source.as_bytes()[pos - 1] == b'\n';

        if at_line_start {
            let line_end = rest.find('\n').map(|i| i + 1).unwrap_or(rest.len());
            let line = &rest[..line_end];
            let was_fenced = in_fence.is_some();
            in_fence = match (in_fence.take(), fence_marker(line)) {
                (Some(open), Some(m)) if m.starts_with(open.as_str()) => None,
                (Some(open), _) => Some(open),
                (None, marker) => marker,
            };
            if was_fenced || in_fence.is_some() {
                text.push_str(line);
                pos += line_end;
                continue;
            }
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };

        if ch == '`' {
            let consumed = code_span_len(rest);
            text.push_str(&rest[..consumed]);
            pos += consumed;
            continue;
        }

        if ch == '<' {
            if let Some(caps) = CLOSE_TAG.captures(rest) {
                let name = caps[1].to_string();
                let consumed = caps[0].len();
                flush(&mut text, &mut stack, &mut root);

                let element = stack.pop().ok_or_else(|| CompileError::StrayClose(name.clone()))?;
                if element.name != name {
                    return Err(CompileError::MismatchedClose {
                        expected: element.name,
                        found: name,
                    });
                }
                push_node(Node::Element(element), &mut stack, &mut root);
                pos += consumed;
                continue;
            }

            if let Some(caps) = OPEN_TAG.captures(rest) {
                let name = caps[1].to_string();
                let after_name = caps[0].len();
                let (props, self_closing, attrs_len) = parse_attributes(&name, &rest[after_name..])?;
                flush(&mut text, &mut stack, &mut root);

                let element = Element {
                    name,
                    props,
                    children: Vec::new(),
                };
                if self_closing {
                    push_node(Node::Element(element), &mut stack, &mut root);
                } else {
                    stack.push(element);
                }
                pos += after_name + attrs_len;
                continue;
            }
        }

        text.push(ch);
        pos += ch.len_utf8();
    }

    if let Some(open) = stack.pop() {
        return Err(CompileError::Unclosed(open.name));
    }
    flush(&mut text, &mut stack, &mut root);
    Ok(root)
}

fn push_node(node: Node, stack: &mut [Element], root: &mut Vec<Node>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => root.push(node),
    }
}

fn flush(text: &mut String, stack: &mut [Element], root: &mut Vec<Node>) {
    if !text.is_empty() {
        push_node(Node::Markdown(std::mem::take(text)), stack, root);
    }
}

/// Opening fence (``` or ~~~, three or more) at the start of a line
fn fence_marker(line: &str) -> Option<String> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    for fence in ['`', '~'] {
        let count = trimmed.chars().take_while(|&c| c == fence).count();
        if count >= 3 {
            return Some(std::iter::repeat(fence).take(count).collect());
        }
    }
    None
}

/// Length of an inline code span starting at `rest`, or of the bare
/// backtick run when it is never closed
fn code_span_len(rest: &str) -> usize {
    let run = rest.chars().take_while(|&c| c == '`').count();
    let delimiter = &rest[..run];
    let mut search = run;
    while let Some(found) = rest[search..].find(delimiter) {
        let start = search + found;
        let end_run = rest[start..].chars().take_while(|&c| c == '`').count();
        if end_run == run {
            return start + run;
        }
        search = start + end_run;
    }
    run
}

/// Parse attributes after the component name up to and including `>` or `/>`.
/// Returns (props, self_closing, bytes consumed).
fn parse_attributes(component: &str, input: &str) -> Result<(Props, bool, usize), CompileError> {
    let attr_error = |message: &str| CompileError::Attribute {
        component: component.to_string(),
        message: message.to_string(),
    };

    let mut props = Props::new(component);
    let mut pos = 0;

    loop {
        let rest = &input[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();

        if trimmed.is_empty() {
            return Err(CompileError::Unclosed(component.to_string()));
        }
        if trimmed.starts_with("/>") {
            return Ok((props, true, pos + 2));
        }
        if trimmed.starts_with('>') {
            return Ok((props, false, pos + 1));
        }

        let name = ATTR_NAME
            .find(trimmed)
            .ok_or_else(|| attr_error(&format!("unexpected `{}`", first_char(trimmed))))?
            .as_str()
            .to_string();
        pos += name.len();

        let after_name = &input[pos..];
        let Some(value_src) = after_name.trim_start().strip_prefix('=') else {
            props.values.insert(name, PropValue::Bool(true));
            continue;
        };
        pos += after_name.len() - value_src.len();

        let value_trimmed = value_src.trim_start();
        pos += value_src.len() - value_trimmed.len();

        let (value, consumed) = match first_char(value_trimmed) {
            quote @ ('"' | '\'') => {
                let body = &value_trimmed[1..];
                let end = body
                    .find(quote)
                    .ok_or_else(|| attr_error(&format!("unterminated string for `{}`", name)))?;
                (PropValue::Str(body[..end].to_string()), end + 2)
            }
            '{' => {
                let end = matching_brace(value_trimmed)
                    .ok_or_else(|| attr_error(&format!("unterminated expression for `{}`", name)))?;
                let expr = &value_trimmed[1..end];
                let value = expression_value(expr)
                    .ok_or_else(|| attr_error(&format!("unsupported expression for `{}`", name)))?;
                (value, end + 1)
            }
            _ => return Err(attr_error(&format!("missing value for `{}`", name))),
        };
        props.values.insert(name, value);
        pos += consumed;
    }
}

fn first_char(s: &str) -> char {
    s.chars().next().unwrap_or(' ')
}

/// Index of the `}` that closes the `{` at position 0, skipping string literals
fn matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Literal expressions only: numbers, booleans, strings, arrays of strings
fn expression_value(expr: &str) -> Option<PropValue> {
    let expr = expr.trim();
    // Single-quoted JS strings become JSON strings
    let normalized;
    let json = if expr.contains('\'') && !expr.contains('"') {
        normalized = expr.replace('\'', "\"");
        normalized.as_str()
    } else {
        expr
    };

    match serde_json::from_str::<serde_json::Value>(json).ok()? {
        serde_json::Value::Number(n) => n.as_f64().map(PropValue::Number),
        serde_json::Value::Bool(b) => Some(PropValue::Bool(b)),
        serde_json::Value::String(s) => Some(PropValue::Str(s)),
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(PropValue::List),
        _ => None,
    }
}
