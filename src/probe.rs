//! Shared HTTP client for every request of one scan
//!
//! One [`ProbeClient`] is built per scan and dropped when the scan ends, so its
//! connection pool never outlives the scan. Every request returns a plain
//! `Result`; callers decide whether a [`ProbeFailure`] is fatal.

use crate::config::AnalyzerConfig;
use crate::error::{Error, Result};
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, redirect};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum number of redirects followed per request
const MAX_REDIRECTS: usize = 10;

/// A follow-up request that did not produce a response
#[derive(Debug, Error)]
pub enum ProbeFailure {
    /// Path could not be joined onto the base URL
    #[error("invalid probe path '{0}'")]
    InvalidPath(String),

    /// Transport failure or timeout
    #[error("probe request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Status, headers and (possibly truncated) body of a response
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    /// Final URL after redirects
    pub url: Url,
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body decoded as text; empty for HEAD
    pub body: String,
}

impl ProbeResponse {
    /// True for any 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// True when the status is one of `statuses`
    pub fn status_in(&self, statuses: &[u16]) -> bool {
        statuses.contains(&self.status)
    }
}

/// Connection-reusing client bound to one target site
#[derive(Debug, Clone)]
pub struct ProbeClient {
    client: Client,
    base_url: Url,
}

impl ProbeClient {
    /// Build a client for `base_url` using the configured timeout and user agent
    pub fn new(base_url: Url, config: &AnalyzerConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .danger_accept_invalid_certs(false)
            .build()
            .map_err(|e| Error::HttpClient(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Base URL of the target site
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a site-relative path (e.g. `/wp-json/`) against the base URL
    pub fn resolve(&self, path: &str) -> std::result::Result<Url, ProbeFailure> {
        self.base_url
            .join(path)
            .map_err(|_| ProbeFailure::InvalidPath(path.to_string()))
    }

    /// Issue a request and read the whole body
    pub async fn fetch(
        &self,
        method: Method,
        path: &str,
        timeout: Option<Duration>,
    ) -> std::result::Result<ProbeResponse, ProbeFailure> {
        self.send(method, path, timeout, None).await
    }

    /// GET `path` with the client's default timeout
    pub async fn get(&self, path: &str) -> std::result::Result<ProbeResponse, ProbeFailure> {
        self.fetch(Method::GET, path, None).await
    }

    /// GET `path` but stop reading the body after `limit` bytes
    pub async fn get_prefix(
        &self,
        path: &str,
        limit: usize,
        timeout: Option<Duration>,
    ) -> std::result::Result<ProbeResponse, ProbeFailure> {
        self.send(Method::GET, path, timeout, Some(limit)).await
    }

    /// HEAD `path`, optionally with a per-request timeout
    pub async fn head(
        &self,
        path: &str,
        timeout: Option<Duration>,
    ) -> std::result::Result<ProbeResponse, ProbeFailure> {
        self.fetch(Method::HEAD, path, timeout).await
    }

    /// POST an empty body to `path`
    pub async fn post(&self, path: &str) -> std::result::Result<ProbeResponse, ProbeFailure> {
        self.fetch(Method::POST, path, None).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        timeout: Option<Duration>,
        limit: Option<usize>,
    ) -> std::result::Result<ProbeResponse, ProbeFailure> {
        let url = self.resolve(path)?;
        let is_head = method == Method::HEAD;

        let mut request = self.client.request(method, url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let mut response = request.send().await?;
        let url = response.url().clone();
        let status = response.status().as_u16();
        let headers = response.headers().clone();

        let body = if is_head {
            String::new()
        } else if let Some(limit) = limit {
            let mut bytes = Vec::with_capacity(limit);
            while bytes.len() < limit {
                match response.chunk().await? {
                    Some(chunk) => bytes.extend_from_slice(&chunk),
                    None => break,
                }
            }
            bytes.truncate(limit);
            String::from_utf8_lossy(&bytes).into_owned()
        } else {
            response.text().await?
        };

        Ok(ProbeResponse {
            url,
            status,
            headers,
            body,
        })
    }
}
