//! Interpret the notification preview template against a sample context and
//! print the resulting element tree, then fire the bound press handler.
//!
//! Usage: cargo run -p sdr-core --example notification

use sdr_core::{Content, Context, Interpreter, Props, Registry, TemplateNode, Value};
use serde_json::json;
use std::process;

#[derive(Debug)]
struct Element {
    kind: String,
    props: Props,
    content: Content<Element>,
}

fn element(kind: &'static str) -> impl Fn(Props, Content<Element>) -> Element + Send + Sync {
    move |props, content| Element {
        kind: kind.to_string(),
        props,
        content,
    }
}

fn print_tree(el: &Element, depth: usize) {
    let pad = "  ".repeat(depth);
    let props: Vec<String> = el
        .props
        .iter()
        .map(|(k, v)| format!("{k}={v:?}"))
        .collect();
    match &el.content {
        Content::Elements(children) => {
            println!("{pad}<{} {}>", el.kind, props.join(" "));
            for child in children {
                print_tree(child, depth + 1);
            }
        }
        other => println!(
            "{pad}<{} {}> {}",
            el.kind,
            props.join(" "),
            other.text().unwrap_or_default()
        ),
    }
}

fn find_invocation(el: &Element) -> Option<&sdr_core::Invocation> {
    if let Some(inv) = el.props.get("onPress").and_then(Value::as_invocation) {
        return Some(inv);
    }
    match &el.content {
        Content::Elements(children) => children.iter().find_map(find_invocation),
        _ => None,
    }
}

fn main() {
    let template = TemplateNode::from_json(&json!({
        "type": "View",
        "props": {"style": {"height": 140, "backgroundColor": "#F3E5F5"}},
        "children": [
            {"type": "Text", "children": "${text::notification.userName}"},
            {"type": "Image", "props": {"source": {"uri": "prop::notification.icon"}}},
            {"type": "Text", "children": "${text::notification.title}"},
            {
                "type": "Button",
                "props": {"onPress": "function::notification.onPress(prop::notification.userName)"},
                "children": [{"type": "Text", "children": "Open ${text::notification.userName}'s profile"}]
            }
        ]
    }))
    .unwrap_or_else(|e| {
        eprintln!("template: {e}");
        process::exit(1);
    });

    let ctx = Context::from_json(json!({
        "notification": {
            "title": "Liked your post",
            "userName": "John Doe",
            "icon": "https://example.com/cat.jpeg"
        }
    }))
    .with_function("notification.onPress", |args| {
        let name = args.first().and_then(Value::text).unwrap_or_default();
        println!("{name} liked your post!");
        Value::Null
    });

    let registry = Registry::new()
        .with("View", element("View"))
        .with("Text", element("Text"))
        .with("Image", element("Image"))
        .with("Button", element("Button"));

    let tree = Interpreter::new(&ctx, &registry)
        .build(&template)
        .unwrap_or_else(|e| {
            eprintln!("build: {e}");
            process::exit(1);
        });

    print_tree(&tree, 0);
    if let Some(inv) = find_invocation(&tree) {
        inv.invoke();
    }
}
