//! Navigation engine module
//!
//! The crawl pipeline never talks HTTP directly; it asks a [`PageEngine`]
//! to navigate and hand back a [`LoadedPage`]. This keeps the pipeline
//! independent of how pages are actually obtained:
//! - [`HttpEngine`] is the shipped implementation (plain HTTP fetch)
//! - tests drive the pipeline with scripted in-memory engines

mod http;
mod page;

pub use http::{build_http_client, HttpEngine};
pub use page::LoadedPage;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// What a navigation waits for before handing the page over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitPolicy {
    /// The document finished loading
    Load,
    /// The document finished loading and contains the given selector
    Selector(String),
}

impl WaitPolicy {
    /// Convenience constructor for the wait-for-selector policy
    pub fn selector(selector: impl Into<String>) -> Self {
        WaitPolicy::Selector(selector.into())
    }
}

/// Navigation failures
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Non-HTML content '{content_type}' from {url}")]
    NotHtml { url: String, content_type: String },

    #[error("Wait target '{selector}' never appeared on {url}")]
    WaitTarget { url: String, selector: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl EngineError {
    /// Whether retrying the navigation has any chance of succeeding
    ///
    /// Transient conditions (timeouts, connection drops, HTTP 5xx/429, a
    /// wait target that did not show up this time) are retryable. Definite
    /// answers from the server (other 4xx, non-HTML content) are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Request { .. } => true,
            EngineError::Status { status, .. } => *status >= 500 || *status == 429,
            EngineError::NotHtml { .. } => false,
            EngineError::WaitTarget { .. } => true,
            EngineError::Client(_) => false,
        }
    }
}

/// A navigation engine: loads pages on request
///
/// One engine instance represents one navigation session and is shared by
/// the workers of a crawl run; implementations must be safe to call
/// concurrently. Session teardown is RAII: dropping the engine releases it
/// on every exit path, including aborts.
#[async_trait]
pub trait PageEngine: Send + Sync {
    /// Navigates to `url` and returns the loaded page once `wait` is satisfied
    async fn navigate(&self, url: &Url, wait: WaitPolicy) -> Result<LoadedPage, EngineError>;
}
