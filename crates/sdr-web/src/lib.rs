//! SDR Web crate.
//!
//! The asynchronous edge around `sdr-core`: fetching template documents,
//! tracking each fetch as an [`Acquisition`], rendering interpreted trees to
//! HTML, and (feature `axum`) serving a directory of templates over HTTP.

pub mod acquisition;
#[cfg(feature = "axum")]
pub mod adapters;
pub mod config;
pub mod fetch;
pub mod html;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use acquisition::{Acquisition, AcquisitionError, AcquisitionState};
#[cfg(feature = "axum")]
pub use adapters::axum::template_router;
pub use config::{ClientConfig, HttpMethod, join_url};
pub use fetch::{DirFetcher, FetchError, HttpFetcher, TemplateFetcher};
pub use html::{HtmlElement, escape_html, html_registry, render_state};
