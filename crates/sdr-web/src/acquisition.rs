//! Asynchronous template acquisition.
//!
//! An [`Acquisition`] owns one fetch attempt at a time and publishes its
//! progress through a `watch` channel:
//!
//! ```text
//! Pending --fetch ok, document valid--> Ready(document)
//!    \------fetch or parse failure----> Failed(error)
//! ```
//!
//! There are no retries. [`Acquisition::reload`] starts a fresh attempt from a
//! settled state and is ignored while one is still in flight.

use crate::fetch::{FetchError, TemplateFetcher};
use sdr_core::{TemplateError, TemplateNode};
use serde_json::Value as Json;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcquisitionError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("invalid template document: {0}")]
    Template(#[from] TemplateError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AcquisitionState {
    Pending,
    Ready(Arc<TemplateNode>),
    Failed(AcquisitionError),
}

impl AcquisitionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, AcquisitionState::Pending)
    }

    pub fn document(&self) -> Option<&TemplateNode> {
        match self {
            AcquisitionState::Ready(node) => Some(node),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AcquisitionError> {
        match self {
            AcquisitionState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Pick what to show for this state: the loading placeholder, the error
    /// placeholder, or whatever `ready` produces from the document.
    pub fn view<T>(
        &self,
        loading: impl FnOnce() -> T,
        error: impl FnOnce(&AcquisitionError) -> T,
        ready: impl FnOnce(&TemplateNode) -> T,
    ) -> T {
        match self {
            AcquisitionState::Pending => loading(),
            AcquisitionState::Failed(err) => error(err),
            AcquisitionState::Ready(node) => ready(node),
        }
    }
}

pub struct Acquisition {
    fetcher: Arc<dyn TemplateFetcher>,
    path: String,
    tx: Arc<watch::Sender<AcquisitionState>>,
    rx: watch::Receiver<AcquisitionState>,
}

impl Acquisition {
    /// Begin fetching `path`. Must be called from within a tokio runtime.
    pub fn start(fetcher: Arc<dyn TemplateFetcher>, path: impl Into<String>) -> Self {
        let (tx, rx) = watch::channel(AcquisitionState::Pending);
        let acquisition = Self {
            fetcher,
            path: path.into(),
            tx: Arc::new(tx),
            rx,
        };
        acquisition.spawn_attempt();
        acquisition
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AcquisitionState {
        self.rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AcquisitionState> {
        self.rx.clone()
    }

    /// Wait until the current attempt leaves `Pending`.
    pub async fn settled(&self) -> AcquisitionState {
        let mut rx = self.rx.clone();
        if let Ok(state) = rx.wait_for(|state| !state.is_pending()).await {
            return state.clone();
        }
        rx.borrow().clone()
    }

    /// Start a new attempt if the previous one has settled.
    ///
    /// Returns `false` and does nothing while an attempt is in flight.
    pub fn reload(&self) -> bool {
        let restarted = self.tx.send_if_modified(|state| {
            if state.is_pending() {
                return false;
            }
            *state = AcquisitionState::Pending;
            true
        });
        if restarted {
            tracing::info!(path = %self.path, "reloading template");
            self.spawn_attempt();
        } else {
            tracing::debug!(path = %self.path, "reload ignored while fetch is pending");
        }
        restarted
    }

    fn spawn_attempt(&self) {
        let fetcher = Arc::clone(&self.fetcher);
        let path = self.path.clone();
        let tx = Arc::clone(&self.tx);
        tracing::info!(path = %path, "acquiring template");
        tokio::spawn(async move {
            let target = path.clone();
            let outcome = tokio::task::spawn_blocking(move || fetcher.fetch(&target)).await;
            tx.send_replace(settle(&path, outcome));
        });
    }
}

fn settle(path: &str, outcome: Result<Result<Json, FetchError>, JoinError>) -> AcquisitionState {
    let document = outcome
        .map_err(|e| FetchError::Join(e.to_string()))
        .and_then(|fetched| fetched)
        .map_err(AcquisitionError::from)
        .and_then(|json| TemplateNode::from_json(&json).map_err(AcquisitionError::from));

    match document {
        Ok(node) => {
            tracing::info!(path, nodes = node.node_count(), "template ready");
            AcquisitionState::Ready(Arc::new(node))
        }
        Err(err) => {
            tracing::warn!(path, error = %err, "template acquisition failed");
            AcquisitionState::Failed(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;

    fn fixed(doc: Json) -> Arc<dyn TemplateFetcher> {
        Arc::new(move |_: &str| -> Result<Json, FetchError> { Ok(doc.clone()) })
    }

    #[tokio::test]
    async fn successful_fetch_becomes_ready() {
        let acq = Acquisition::start(
            fixed(json!({"type": "View", "children": [{"type": "Text", "children": "hi"}]})),
            "notifications/full",
        );
        let state = acq.settled().await;
        let doc = state.document().expect("ready");
        assert_eq!(doc.type_name, "View");
        assert_eq!(doc.node_count(), 2);
        assert_eq!(acq.state(), state);
        assert_eq!(acq.path(), "notifications/full");
    }

    #[tokio::test]
    async fn fetch_failure_becomes_failed() {
        let fetcher: Arc<dyn TemplateFetcher> = Arc::new(|path: &str| -> Result<Json, FetchError> {
            Err(FetchError::Status {
                method: "GET".to_string(),
                url: format!("http://h/{path}"),
                status: 503,
            })
        });
        let acq = Acquisition::start(fetcher, "x");
        let state = acq.settled().await;
        assert!(matches!(
            state.error(),
            Some(AcquisitionError::Fetch(FetchError::Status { status: 503, .. }))
        ));
    }

    #[tokio::test]
    async fn malformed_document_becomes_failed() {
        let acq = Acquisition::start(fixed(json!([1, 2, 3])), "x");
        let state = acq.settled().await;
        assert!(matches!(
            state.error(),
            Some(AcquisitionError::Template(TemplateError::NotAnObject { .. }))
        ));
    }

    #[tokio::test]
    async fn panicking_fetcher_fails_instead_of_hanging() {
        let fetcher: Arc<dyn TemplateFetcher> =
            Arc::new(|_: &str| -> Result<Json, FetchError> { panic!("fetcher exploded") });
        let acq = Acquisition::start(fetcher, "x");
        let state = acq.settled().await;
        assert!(matches!(
            state.error(),
            Some(AcquisitionError::Fetch(FetchError::Join(_)))
        ));
    }

    #[tokio::test]
    async fn reload_is_ignored_while_pending() {
        let (release, gate) = mpsc::channel::<()>();
        let gate = Mutex::new(gate);
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let fetcher: Arc<dyn TemplateFetcher> = Arc::new(move |_: &str| -> Result<Json, FetchError> {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Ok(rx) = gate.lock() {
                let _ = rx.recv();
            }
            Ok(json!({"type": "View"}))
        });

        let acq = Acquisition::start(fetcher, "slow");
        assert!(acq.state().is_pending());
        assert!(!acq.reload());

        release.send(()).expect("release first attempt");
        assert!(acq.settled().await.document().is_some());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);

        assert!(acq.reload());
        assert!(acq.state().is_pending());
        release.send(()).expect("release second attempt");
        assert!(acq.settled().await.document().is_some());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn view_selects_placeholder_per_state() {
        let label = |state: &AcquisitionState| {
            state.view(
                || "loading".to_string(),
                |err| format!("error: {err}"),
                |doc| format!("ready: {}", doc.type_name),
            )
        };
        assert_eq!(label(&AcquisitionState::Pending), "loading");
        assert_eq!(
            label(&AcquisitionState::Failed(FetchError::NotFound("a".into()).into())),
            "error: template not found: a"
        );
        let acq = Acquisition::start(fixed(json!({"type": "Text"})), "t");
        assert_eq!(label(&acq.settled().await), "ready: Text");
    }
}
