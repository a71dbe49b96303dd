//! Ready-made HTML output for interpreted templates.
//!
//! [`html_registry`] maps the common server-driven UI primitives onto HTML
//! elements so a template can be rendered without a host UI toolkit:
//!
//! | type | tag |
//! |---|---|
//! | `View` | `div` |
//! | `Text` | `span` |
//! | `Image` | `img` (`source.uri` becomes `src`) |
//! | `Button` | `button` |

use crate::acquisition::AcquisitionState;
use sdr_core::{BuildError, Content, Context, Interpreter, Props, Registry, Value};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HtmlElement {
    pub tag: String,
    pub attrs: Vec<(String, Option<String>)>,
    pub text: Option<String>,
    pub children: Vec<HtmlElement>,
}

const VOID_TAGS: &[&str] = &["img", "br", "hr", "input"];

const UNITLESS_STYLE: &[&str] = &[
    "flex",
    "flexGrow",
    "flexShrink",
    "opacity",
    "zIndex",
    "fontWeight",
    "aspectRatio",
];

impl HtmlElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), Some(value.into())));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            if !is_attr_name(name) {
                continue;
            }
            out.push(' ');
            out.push_str(name);
            if let Some(value) = value {
                out.push_str(&format!("=\"{}\"", escape_html(value)));
            }
        }
        out.push('>');
        if VOID_TAGS.contains(&self.tag.as_str()) {
            return;
        }
        if let Some(text) = &self.text {
            out.push_str(&escape_html(text));
        }
        for child in &self.children {
            child.render_into(out);
        }
        out.push_str(&format!("</{}>", self.tag));
    }
}

/// Registry of the built-in primitives.
pub fn html_registry() -> Registry<HtmlElement> {
    Registry::new()
        .with("View", view)
        .with("Text", text)
        .with("Image", image)
        .with("Button", button)
}

fn view(props: Props, content: Content<HtmlElement>) -> HtmlElement {
    element("div", props, content)
}

fn text(props: Props, content: Content<HtmlElement>) -> HtmlElement {
    element("span", props, content)
}

fn image(props: Props, content: Content<HtmlElement>) -> HtmlElement {
    element("img", props, content)
}

fn button(props: Props, content: Content<HtmlElement>) -> HtmlElement {
    let mut el = element("button", props, content);
    el.attrs.insert(0, ("type".to_string(), Some("button".to_string())));
    el
}

/// Build `ctx` + `state` into HTML: a loading marker while pending, an error
/// marker on failure, otherwise the interpreted document.
pub fn render_state(
    state: &AcquisitionState,
    ctx: &Context,
    registry: &Registry<HtmlElement>,
) -> Result<String, BuildError> {
    state.view(
        || Ok(HtmlElement::new("div").with_attr("data-state", "loading").render()),
        |err| {
            Ok(HtmlElement::new("div")
                .with_attr("data-state", "error")
                .with_text(err.to_string())
                .render())
        },
        |doc| {
            Interpreter::new(ctx, registry)
                .build(doc)
                .map(|el| el.render())
        },
    )
}

fn element(tag: &str, props: Props, content: Content<HtmlElement>) -> HtmlElement {
    let mut el = HtmlElement::new(tag);
    for (name, value) in &props {
        push_prop(&mut el, tag, name, value);
    }
    match content {
        Content::Empty => {}
        Content::Leaf(leaf) => el.text = leaf.text(),
        Content::Elements(children) => el.children = children,
    }
    el
}

fn push_prop(el: &mut HtmlElement, tag: &str, name: &str, value: &Value) {
    if !is_attr_name(name) {
        tracing::warn!(prop = %name, "dropping prop with unsafe name");
        return;
    }
    match (name, value) {
        (_, Value::Null) => {}
        ("style", Value::Object(style)) => {
            let css = style
                .iter()
                .filter(|(prop, _)| is_attr_name(prop))
                .filter_map(|(prop, v)| style_value(prop, v).map(|v| format!("{}: {v}", kebab(prop))))
                .collect::<Vec<_>>()
                .join("; ");
            if !css.is_empty() {
                el.attrs.push(("style".to_string(), Some(css)));
            }
        }
        ("source", Value::Object(source)) if tag == "img" => {
            if let Some(uri) = source.get("uri").and_then(Value::text) {
                el.attrs.push(("src".to_string(), Some(uri)));
            }
        }
        ("key", v) => {
            if let Some(key) = v.text() {
                el.attrs.push(("data-key".to_string(), Some(key)));
            }
        }
        ("alt" | "title" | "id", v) => {
            if let Some(text) = v.text() {
                el.attrs.push((name.to_string(), Some(text)));
            }
        }
        ("accessibilityLabel", v) => {
            if let Some(text) = v.text() {
                el.attrs.push(("aria-label".to_string(), Some(text)));
            }
        }
        (_, Value::Invocation(inv)) => {
            let target = inv.target().map(|c| c.name().to_string()).unwrap_or_default();
            el.attrs
                .push((format!("data-action-{}", kebab(name)), Some(target)));
        }
        (_, Value::Function(callable)) => {
            el.attrs.push((
                format!("data-action-{}", kebab(name)),
                Some(callable.name().to_string()),
            ));
        }
        (_, Value::Bool(true)) => el.attrs.push((format!("data-{}", kebab(name)), None)),
        (_, Value::Bool(false)) => {}
        (_, Value::Array(_) | Value::Object(_)) => {
            el.attrs.push((
                format!("data-{}", kebab(name)),
                Some(value.to_json().to_string()),
            ));
        }
        (_, scalar) => {
            if let Some(text) = scalar.text() {
                el.attrs.push((format!("data-{}", kebab(name)), Some(text)));
            }
        }
    }
}

fn style_value(prop: &str, value: &Value) -> Option<String> {
    match value {
        Value::Number(_) if !UNITLESS_STYLE.contains(&prop) => value.text().map(|n| format!("{n}px")),
        Value::String(_) | Value::Number(_) => value.text(),
        _ => None,
    }
}

/// Prop and attribute names are limited to `[A-Za-z0-9_-]`.
fn is_attr_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}

/// `backgroundColor` -> `background-color`, `testID` -> `test-id`.
///
/// A run of capitals is one word; its last capital starts a new word when a
/// lowercase letter follows (`HTMLParser` -> `html-parser`).
fn kebab(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
