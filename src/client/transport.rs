//! HTTP transport for the search index
//!
//! This module handles:
//! - Building the shared HTTP client with the crawler's user agent
//! - Sending one request body to one index operation
//! - Classifying failures into status, network and decode errors
//!
//! No retry happens here; the pagination controller decides what a failure
//! means for the current key.

use crate::client::endpoint::{EndpointKind, SearchEndpoint};
use crate::client::response::SearchResponse;
use crate::config::{Config, UserAgentConfig};
use crate::query::SearchRequest;
use crate::HistoryError;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Optional whole-request timeout; `None` waits indefinitely
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Option<Duration>,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version
    let user_agent = format!("{}/{}", config.crawler_name, config.crawler_version);

    let mut builder = Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder.build()
}

/// Client for one search index
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: Client,
    endpoint: SearchEndpoint,
}

impl SearchClient {
    /// Creates a client from an HTTP client and an endpoint
    pub fn new(http: Client, endpoint: SearchEndpoint) -> Self {
        Self { http, endpoint }
    }

    /// Creates a client from the loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, HistoryError> {
        let endpoint = SearchEndpoint::new(
            &config.search.endpoint,
            &config.search.scroll_keep_alive,
        )?;
        let timeout = config.search.request_timeout_secs.map(Duration::from_secs);
        let http = build_http_client(&config.user_agent, timeout)?;
        Ok(Self::new(http, endpoint))
    }

    /// Returns the endpoint this client talks to
    pub fn endpoint(&self) -> &SearchEndpoint {
        &self.endpoint
    }

    /// Sends `request` as a GET body to the given operation
    ///
    /// # Returns
    ///
    /// * `Ok(SearchResponse)` - 2xx response with a decodable body
    /// * `Err(HistoryError::Transport)` - Non-2xx status, with the raw body
    /// * `Err(HistoryError::Http)` - Connection or read failure
    /// * `Err(HistoryError::Decode)` - Body is not a search response
    pub async fn send(
        &self,
        kind: EndpointKind,
        request: &SearchRequest,
    ) -> Result<SearchResponse, HistoryError> {
        let url = self.endpoint.url(kind);
        tracing::debug!("GET {}", url);

        let body = serde_json::to_vec(request).map_err(|e| HistoryError::Decode {
            endpoint: url.clone(),
            message: format!("failed to encode request: {}", e),
        })?;

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|source| HistoryError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| HistoryError::Http {
            url: url.clone(),
            source,
        })?;

        if !status.is_success() {
            return Err(HistoryError::Transport {
                endpoint: url,
                status: status.as_u16(),
                body: text,
            });
        }

        SearchResponse::decode(&text).map_err(|e| HistoryError::Decode {
            endpoint: url,
            message: e.to_string(),
        })
    }
}
