use crate::config::ClientConfig;
use serde_json::Value;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("http transport error for {method} {url}: {message}")]
    Transport {
        method: String,
        url: String,
        message: String,
    },
    #[error("{method} {url} returned status {status}")]
    Status {
        method: String,
        url: String,
        status: u16,
    },
    #[error("template not found: {0}")]
    NotFound(String),
    #[error("malformed template document from {origin}: {message}")]
    Malformed { origin: String, message: String },
    #[error("fetch task failed: {0}")]
    Join(String),
}

/// Retrieves one raw template document by relative path.
///
/// Implementations block; the acquisition runs them off the async runtime.
pub trait TemplateFetcher: Send + Sync {
    fn fetch(&self, path: &str) -> Result<Value, FetchError>;
}

impl<F> TemplateFetcher for F
where
    F: Fn(&str) -> Result<Value, FetchError> + Send + Sync,
{
    fn fetch(&self, path: &str) -> Result<Value, FetchError> {
        self(path)
    }
}

/// Fetches templates over HTTP relative to [`ClientConfig::base_url`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    config: ClientConfig,
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(config: ClientConfig) -> Self {
        let timeout = Duration::from_millis(config.timeout_ms.max(1));
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();
        Self { config, agent }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl TemplateFetcher for HttpFetcher {
    fn fetch(&self, path: &str) -> Result<Value, FetchError> {
        let method = self.config.method.as_str();
        let url = self.config.url_for(path);
        tracing::debug!(method, url = %url, "fetching template");

        let mut request = self.agent.request(method, &url);
        for (name, value) in &self.config.headers {
            request = request.set(name, value);
        }

        let response = match request.call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(status, _)) => {
                return Err(FetchError::Status {
                    method: method.to_string(),
                    url,
                    status,
                });
            }
            Err(ureq::Error::Transport(err)) => {
                return Err(FetchError::Transport {
                    method: method.to_string(),
                    url,
                    message: err.to_string(),
                });
            }
        };

        let body = response.into_string().map_err(|e| FetchError::Transport {
            method: method.to_string(),
            url: url.clone(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&body).map_err(|e| FetchError::Malformed {
            origin: url,
            message: e.to_string(),
        })
    }
}

/// Reads templates from `<root>/<path>.json` on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `path`, if the path is safe and the file exists.
    pub fn locate(&self, path: &str) -> Option<PathBuf> {
        let rel = sanitize_rel_path(path)?;
        if rel.as_os_str().is_empty() {
            let index = self.root.join("index.json");
            return index.is_file().then_some(index);
        }
        let direct = self.root.join(&rel);
        if direct.is_file() && direct.extension().is_some_and(|ext| ext == "json") {
            return Some(direct);
        }
        let mut file_name = rel.into_os_string();
        file_name.push(".json");
        let with_ext = self.root.join(file_name);
        with_ext.is_file().then_some(with_ext)
    }
}

impl TemplateFetcher for DirFetcher {
    fn fetch(&self, path: &str) -> Result<Value, FetchError> {
        let file = self
            .locate(path)
            .ok_or_else(|| FetchError::NotFound(path.to_string()))?;
        let origin = file.display().to_string();
        let content = fs::read_to_string(&file).map_err(|e| FetchError::Malformed {
            origin: origin.clone(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| FetchError::Malformed {
            origin,
            message: e.to_string(),
        })
    }
}

/// Relative path with no parent, root or prefix components.
pub(crate) fn sanitize_rel_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim_start_matches('/');
    let rel = PathBuf::from(trimmed);
    for comp in rel.components() {
        if matches!(
            comp,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        ) {
            return None;
        }
    }
    Some(rel)
}
