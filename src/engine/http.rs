//! Plain-HTTP navigation engine
//!
//! Listing sites that render their catalog server-side need no browser; a
//! straight GET plus HTML parsing covers them. The wait-for-selector policy
//! degenerates to a presence check on the fetched document: static markup
//! either contains the target or never will, so an absent target fails the
//! navigation immediately instead of polling.

use crate::config::EngineConfig;
use crate::engine::{EngineError, LoadedPage, PageEngine, WaitPolicy};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Navigation engine backed by a `reqwest` client
pub struct HttpEngine {
    client: Client,
}

impl HttpEngine {
    /// Builds an engine from the engine configuration
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        let client = build_http_client(config).map_err(EngineError::Client)?;
        Ok(Self { client })
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The engine configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &EngineConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.navigation_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

#[async_trait]
impl PageEngine for HttpEngine {
    async fn navigate(&self, url: &Url, wait: WaitPolicy) -> Result<LoadedPage, EngineError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| EngineError::Request {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Check Content-Type; a missing header is assumed to be HTML
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.is_empty() && !content_type.contains("text/html") {
            return Err(EngineError::NotHtml {
                url: url.to_string(),
                content_type,
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| EngineError::Request {
            url: url.to_string(),
            source: e,
        })?;

        let page = LoadedPage::new(final_url, body);

        if let WaitPolicy::Selector(selector) = wait {
            if !page.has_selector(&selector) {
                return Err(EngineError::WaitTarget {
                    url: url.to_string(),
                    selector,
                });
            }
        }

        Ok(page)
    }
}
