//! HTTP fetcher implementation
//!
//! This module handles the lowest layer of the crawler:
//! - Building the shared HTTP client
//! - Single GET requests with bounded retries and linear backoff
//! - Classification of why an attempt failed

use crate::config::HttpConfig;
use crate::SpiderError;
use reqwest::{redirect::Policy, Client, Response};
use std::time::Duration;
use thiserror::Error;

/// Why a single fetch attempt (or the validation of its body) failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptFailure {
    /// The request did not complete within the client timeout
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS, DNS or body-read failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status
    #[error("HTTP {status}")]
    HttpStatus { status: u16 },

    /// The body was too short to be a real page
    #[error("empty or invalid response ({length} characters)")]
    EmptyBody { length: usize },

    /// The body is a relay's block page rather than the target's content
    #[error("proxy returned access denied page (matched {marker:?})")]
    AccessDenied { marker: &'static str },

    /// A sitemap was expected but the body is not sitemap XML
    #[error("response doesn't appear to be sitemap XML")]
    NotSitemap,
}

impl AttemptFailure {
    fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(error.to_string())
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use spellspider::config::HttpConfig;
/// use spellspider::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL, retrying failed attempts with linear backoff
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Return the response immediately |
/// | Non-2xx status | Count as failure, retry |
/// | Timeout / transport error | Count as failure, retry |
///
/// Between attempt `n` and `n + 1` the fetcher sleeps `base_delay * n`.
/// There is no sleep after the final attempt.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `max_attempts` - Total attempts (values below 1 are treated as 1)
/// * `base_delay` - Backoff base
///
/// # Returns
///
/// * `Ok(Response)` - The first successful response
/// * `Err(SpiderError::FetchExhausted)` - Every attempt failed; carries the last failure
pub async fn fetch_with_retry(
    client: &Client,
    url: &str,
    max_attempts: u32,
    base_delay: Duration,
) -> Result<Response, SpiderError> {
    let max_attempts = max_attempts.max(1);
    let mut last = AttemptFailure::Transport("no attempt made".to_string());

    for attempt in 1..=max_attempts {
        tracing::trace!("GET {} (attempt {}/{})", url, attempt, max_attempts);

        match client.get(url).send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => {
                last = AttemptFailure::HttpStatus {
                    status: response.status().as_u16(),
                };
            }
            Err(e) => last = AttemptFailure::from_reqwest(&e),
        }

        tracing::debug!("Attempt {}/{} for {} failed: {}", attempt, max_attempts, url, last);

        if attempt < max_attempts {
            tokio::time::sleep(base_delay * attempt).await;
        }
    }

    Err(SpiderError::FetchExhausted {
        url: url.to_string(),
        attempts: max_attempts,
        last,
    })
}

/// Reads a response body as text, classifying read failures
pub async fn read_body(response: Response) -> Result<String, AttemptFailure> {
    response
        .text()
        .await
        .map_err(|e| AttemptFailure::from_reqwest(&e))
}
