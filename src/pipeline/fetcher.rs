//! HTTP fetcher implementation
//!
//! This module handles retrieval of the listing page, including:
//! - Building the request from the source configuration
//! - Browser-like headers the upstream expects
//! - A bounded whole-request timeout
//! - Error classification into [`FetchError`]
//!
//! There is no retry logic here; a failed fetch simply fails the refresh.

use crate::config::SourceConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while retrieving the source document
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("HTTP error for {url}: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("Invalid header value for {name}")]
    InvalidHeader { name: String },
}

/// A fully described fetch: where, with which headers, and for how long
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl FetchRequest {
    /// Builds the request described by the `[source]` config section
    pub fn from_config(config: &SourceConfig) -> Self {
        Self {
            url: config.url.clone(),
            headers: vec![
                (ACCEPT.as_str().to_string(), config.accept.clone()),
                (ACCEPT_LANGUAGE.as_str().to_string(), config.accept_language.clone()),
                (REFERER.as_str().to_string(), config.referer.clone()),
            ],
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

/// Retrieves the raw source document
///
/// Implementations must bound the call by `request.timeout`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError>;
}

/// Fetcher backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher whose client carries the configured User-Agent
    pub fn from_config(config: &SourceConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

/// Builds an HTTP client with a browser-like identity
///
/// # Example
///
/// ```no_run
/// use pricewatch::config::SourceConfig;
/// use pricewatch::pipeline::build_http_client;
///
/// let client = build_http_client(&SourceConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &SourceConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_millis(config.timeout_ms))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, FetchError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let invalid = || FetchError::InvalidHeader { name: name.clone() };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn classify(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            source: error,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError> {
        let url = request.url.as_str();
        let headers = header_map(&request.headers)?;

        tracing::debug!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .headers(headers)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| classify(url, e))?;
        tracing::debug!("Fetched {} bytes from {}", body.len(), url);

        Ok(body.to_vec())
    }
}
