use crate::fetch::{DirFetcher, FetchError, TemplateFetcher, sanitize_rel_path};
use axum::Json;
use axum::Router;
use axum::extract::{Path as AxumPath, State as AxumState};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use sdr_core::TemplateNode;
use std::path::PathBuf;
use std::sync::Arc;

/// Serve every `<root>/<path>.json` template document at `GET /<path>`.
///
/// `GET /` serves `index.json`. Documents are validated before they are
/// sent, so clients never receive a tree the interpreter would reject.
pub fn template_router(root: impl Into<PathBuf>) -> Router {
    let templates = Arc::new(DirFetcher::new(root));
    Router::new()
        .route("/", get(route_index))
        .route("/{*path}", get(route_any))
        .with_state(templates)
}

async fn route_index(AxumState(templates): AxumState<Arc<DirFetcher>>) -> Response {
    serve_template(templates, String::new()).await
}

async fn route_any(
    AxumPath(path): AxumPath<String>,
    AxumState(templates): AxumState<Arc<DirFetcher>>,
) -> Response {
    serve_template(templates, path).await
}

async fn serve_template(templates: Arc<DirFetcher>, path: String) -> Response {
    if sanitize_rel_path(&path).is_none() {
        tracing::warn!(path = %path, "rejected template path");
        return (StatusCode::BAD_REQUEST, "invalid path").into_response();
    }

    let target = path.clone();
    let fetched = match tokio::task::spawn_blocking(move || templates.fetch(&target)).await {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("template read failed: {e}"),
            )
                .into_response();
        }
    };

    match fetched {
        Ok(doc) => match TemplateNode::from_json(&doc) {
            Ok(_) => {
                tracing::debug!(path = %path, "serving template");
                Json(doc).into_response()
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "refusing invalid template");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("invalid template: {e}"))
                    .into_response()
            }
        },
        Err(FetchError::NotFound(_)) => (StatusCode::NOT_FOUND, "not found").into_response(),
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "template unreadable");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
