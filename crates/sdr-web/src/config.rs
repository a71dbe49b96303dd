use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Put,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and how templates are fetched.
///
/// Shared by every acquisition made through the same fetcher, the way a
/// single provider configures all template clients beneath it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    5000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            method: HttpMethod::default(),
            base_url: String::new(),
            headers: HashMap::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("failed to parse {}: {e}", path.display()))
    }

    /// Full URL of a template endpoint under `base_url`.
    pub fn url_for(&self, endpoint: &str) -> String {
        join_url(&self.base_url, endpoint)
    }
}

/// Join a base URL and an endpoint with exactly one `/` between them.
///
/// An empty endpoint yields the base unchanged.
pub fn join_url(base: &str, endpoint: &str) -> String {
    if endpoint.is_empty() {
        return base.to_string();
    }
    let mut url = base.to_string();
    if !url.ends_with('/') {
        url.push('/');
    }
    url.push_str(endpoint.strip_prefix('/').unwrap_or(endpoint));
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn join_url_normalizes_single_slash() {
        assert_eq!(join_url("http://h:3000", "a/b"), "http://h:3000/a/b");
        assert_eq!(join_url("http://h:3000/", "/a"), "http://h:3000/a");
        assert_eq!(join_url("http://h:3000/", "a"), "http://h:3000/a");
        assert_eq!(join_url("http://h:3000", "/a"), "http://h:3000/a");
        assert_eq!(join_url("http://h:3000", ""), "http://h:3000");
        assert_eq!(join_url("", "a"), "/a");
    }

    #[test]
    fn config_defaults_and_camel_case() {
        let cfg: ClientConfig = serde_json::from_value(json!({
            "baseUrl": "http://localhost:3000",
            "method": "POST",
            "headers": {"x-app": "demo"}
        }))
        .expect("config");
        assert_eq!(cfg.method, HttpMethod::Post);
        assert_eq!(cfg.timeout_ms, 5000);
        assert_eq!(cfg.url_for("notifications/full"), "http://localhost:3000/notifications/full");

        let empty: ClientConfig = serde_json::from_value(json!({})).expect("config");
        assert_eq!(empty, ClientConfig::default());
    }

    #[test]
    fn rejects_unsupported_method() {
        let bad = serde_json::from_value::<ClientConfig>(json!({"method": "DELETE"}));
        assert!(bad.is_err());
    }

    #[test]
    fn load_reads_json_file() {
        let dir = std::env::temp_dir().join(format!("sdr-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let file = dir.join("sdr.config.json");
        std::fs::write(&file, r#"{"baseUrl": "http://x", "timeoutMs": 50}"#).expect("write");

        let cfg = ClientConfig::load(&file).expect("load");
        assert_eq!(cfg.base_url, "http://x");
        assert_eq!(cfg.timeout_ms, 50);
        assert!(ClientConfig::load(&dir.join("missing.json")).is_err());
    }
}
