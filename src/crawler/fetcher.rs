//! HTTP fetcher implementation
//!
//! This module handles every page request of a run:
//! - Building the HTTP client with browser-like default headers
//! - GET requests returning the page body as text
//! - Retry with exponential backoff for transient failures
//! - Error classification into `FetchError`

use crate::config::FetcherConfig;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Anything that can turn a URL into page markup
///
/// The pipeline only ever talks to this trait, so tests can swap the HTTP
/// client for a canned set of pages.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a page body, retrying transient failures internally
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// Retry budget and backoff schedule for one fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Wait before the first retry; doubled for each retry after it
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &FetcherConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: config.initial_backoff(),
        }
    }

    /// Total number of attempts, the first one included
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// The wait before retry number `retry` (1-based)
    ///
    /// # Example
    ///
    /// ```
    /// use adsweep::crawler::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy { max_retries: 3, initial_backoff: Duration::from_millis(300) };
    /// assert_eq!(policy.backoff_for(1), Duration::from_millis(300));
    /// assert_eq!(policy.backoff_for(3), Duration::from_millis(1200));
    /// ```
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(1u32 << exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetcherConfig::default())
    }
}

/// Returns true for status codes worth another attempt
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS | StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE
    )
}

/// Builds an HTTP client with the configured identity and timeouts
///
/// `Accept-Encoding` is not set here: reqwest adds it for every
/// decompression feature compiled in.
///
/// # Errors
///
/// Returns `reqwest::Error` if a header value is not valid or the TLS
/// backend cannot be initialized.
///
/// # Example
///
/// ```no_run
/// use adsweep::config::FetcherConfig;
/// use adsweep::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&config.accept) {
        headers.insert(ACCEPT, value);
    }
    if let Ok(value) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, value);
    }

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()
}

/// `Fetcher` backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    /// Creates a fetcher from the fetcher configuration section
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            retry: RetryPolicy::from_config(config),
        })
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// One request, classified
    ///
    /// The boolean is true when the failure may go away on retry.
    async fn attempt(&self, url: &Url) -> Result<String, (FetchError, bool)> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| (network_error(url, &e), true))?;

        let status = response.status();
        if !status.is_success() {
            let err = FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            };
            return Err((err, is_retryable_status(status)));
        }

        response
            .text()
            .await
            .map_err(|e| (network_error(url, &e), true))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let attempts = self.retry.attempts();
        let mut attempt = 1;

        loop {
            match self.attempt(url).await {
                Ok(body) => {
                    tracing::debug!(url = %url, attempt, bytes = body.len(), "Fetched page");
                    return Ok(body);
                }
                Err((err, retryable)) if retryable && attempt < attempts => {
                    let backoff = self.retry.backoff_for(attempt);
                    tracing::warn!(
                        url = %url,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        "Fetch failed, retrying: {}",
                        err
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err((err, _)) => {
                    tracing::debug!(url = %url, attempt, "Fetch failed: {}", err);
                    return Err(err);
                }
            }
        }
    }
}

fn network_error(url: &Url, err: &reqwest::Error) -> FetchError {
    let message = if err.is_timeout() {
        "request timeout".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else {
        err.to_string()
    };

    FetchError::Network {
        url: url.to_string(),
        message,
    }
}
