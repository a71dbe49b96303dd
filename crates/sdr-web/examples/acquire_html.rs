//! Acquire a template through an in-memory fetcher and print the HTML for
//! the state before and after the fetch settles.
//!
//! Usage: cargo run -p sdr-web --example acquire_html

use sdr_core::Context;
use sdr_web::{Acquisition, FetchError, TemplateFetcher, html_registry, render_state};
use serde_json::{Value, json};
use std::sync::Arc;

fn notification_template(_path: &str) -> Result<Value, FetchError> {
    Ok(json!({
        "type": "View",
        "props": {"style": {"flexDirection": "row", "padding": 12}},
        "children": [
            {"type": "Image", "props": {"source": {"uri": "prop::notification.icon"}, "style": {"width": 40, "height": 40}}},
            {"type": "Text", "children": "${text::notification.user} ${text::notification.title}"},
            {"type": "Button", "props": {"onPress": "function::notification.open(prop::notification.id)"}, "children": "Open"}
        ]
    }))
}

#[tokio::main]
async fn main() {
    let ctx = Context::from_json(json!({
        "notification": {
            "id": 7,
            "icon": "https://cdn.example.com/avatar.png",
            "user": "John",
            "title": "liked your post"
        }
    }))
    .with_function("notification.open", |args| {
        println!("open notification {args:?}");
        sdr_core::Value::Null
    });
    let registry = html_registry();

    let fetcher: Arc<dyn TemplateFetcher> = Arc::new(notification_template);
    let acquisition = Acquisition::start(fetcher, "notifications/full");
    for state in [acquisition.state(), acquisition.settled().await] {
        match render_state(&state, &ctx, &registry) {
            Ok(html) => println!("{html}"),
            Err(err) => eprintln!("error: {err}"),
        }
    }
}
