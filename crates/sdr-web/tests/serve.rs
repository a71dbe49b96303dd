use sdr_core::Context;
use sdr_web::{
    Acquisition, AcquisitionError, ClientConfig, FetchError, HttpFetcher, TemplateFetcher,
    html_registry, render_state, template_router,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use testing::unique_temp_dir;

#[path = "../src/testing.rs"]
mod testing;

fn write_templates() -> PathBuf {
    let root = unique_temp_dir("sdr-serve");
    std::fs::create_dir_all(root.join("notifications")).expect("mkdir");
    std::fs::write(
        root.join("notifications/full.json"),
        json!({
            "type": "View",
            "props": {"style": {"padding": 8}},
            "children": [
                {"type": "Text", "children": "${text::notification.user} ${text::notification.title}"}
            ]
        })
        .to_string(),
    )
    .expect("write template");
    std::fs::write(root.join("index.json"), r#"{"type": "Text", "children": "home"}"#)
        .expect("write index");
    std::fs::write(root.join("broken.json"), r#"{"children": []}"#).expect("write broken");
    root
}

async fn spawn_server(root: PathBuf) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, template_router(root)).await;
    });
    format!("http://{addr}")
}

async fn fetch(base: &str, path: &str) -> Result<serde_json::Value, FetchError> {
    let fetcher = HttpFetcher::new(ClientConfig::new(base));
    let path = path.to_string();
    tokio::task::spawn_blocking(move || fetcher.fetch(&path))
        .await
        .expect("fetch task")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn serves_templates_and_status_codes() {
    let base = spawn_server(write_templates()).await;

    let doc = fetch(&base, "notifications/full").await.expect("template");
    assert_eq!(doc["type"], json!("View"));

    let index = fetch(&base, "").await.expect("index");
    assert_eq!(index["children"], json!("home"));

    assert!(matches!(
        fetch(&base, "missing").await,
        Err(FetchError::Status { status: 404, .. })
    ));
    assert!(matches!(
        fetch(&base, "broken").await,
        Err(FetchError::Status { status: 500, .. })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn acquisition_over_http_renders_html() {
    let base = spawn_server(write_templates()).await;
    let fetcher: Arc<dyn TemplateFetcher> = Arc::new(HttpFetcher::new(ClientConfig::new(&base)));

    let ctx = Context::from_json(json!({
        "notification": {"user": "John", "title": "liked your post"}
    }));
    let registry = html_registry();

    let ready = Acquisition::start(Arc::clone(&fetcher), "notifications/full");
    let html = render_state(&ready.settled().await, &ctx, &registry).expect("render");
    assert_eq!(
        html,
        "<div data-key=\"0\" style=\"padding: 8px\"><span data-key=\"0.0\">John liked your post</span></div>"
    );

    let missing = Acquisition::start(fetcher, "nope");
    let state = missing.settled().await;
    assert!(matches!(
        state.error(),
        Some(AcquisitionError::Fetch(FetchError::Status { status: 404, .. }))
    ));
    assert!(
        render_state(&state, &ctx, &registry)
            .expect("error placeholder")
            .starts_with("<div data-state=\"error\">")
    );
}
