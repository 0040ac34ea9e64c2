//! Proxy-cascade fetching
//!
//! A browser cannot read third-party pages directly, so every fetch walks an
//! ordered list of routes: the target itself first, then each configured CORS
//! relay. The first route whose body validates wins.

use crate::config::{Config, ProxyConfig, RetryConfig};
use crate::crawler::cascade::{first_success, Strategy, StrategyFailure};
use crate::crawler::fetcher::{build_http_client, fetch_with_retry, read_body, AttemptFailure};
use crate::crawler::parser::{parse_html_content, PageContent};
use crate::crawler::progress::{emit, Progress, ProgressSink};
use crate::SpiderError;
use reqwest::Client;
use std::time::Duration;

/// Substrings that identify a relay's block page
const ACCESS_DENIED_MARKERS: &[&str] = &["Access Denied", "403 Forbidden"];

/// Substrings of which a sitemap body must contain at least one
const SITEMAP_MARKERS: &[&str] = &["<?xml", "<urlset", "<sitemapindex"];

/// How a request reaches the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Request the target URL itself
    Direct,
    /// Request the target through a relay proxy
    Proxy(ProxyConfig),
}

impl Strategy for Route {
    fn name(&self) -> &str {
        match self {
            Self::Direct => "Direct",
            Self::Proxy(proxy) => &proxy.name,
        }
    }
}

/// Fetches pages and sitemaps through the direct-then-proxies cascade
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    retry: RetryConfig,
    proxies: Vec<ProxyConfig>,
}

impl PageFetcher {
    /// Creates a fetcher over an explicit, ordered proxy list
    pub fn new(client: Client, retry: RetryConfig, proxies: Vec<ProxyConfig>) -> Self {
        Self {
            client,
            retry,
            proxies,
        }
    }

    /// Creates a fetcher with a client built from the configuration
    pub fn from_config(config: &Config) -> Result<Self, SpiderError> {
        let client = build_http_client(&config.http)?;
        Ok(Self::new(client, config.retry.clone(), config.proxies.clone()))
    }

    /// The routes tried for every fetch, in order
    pub fn routes(&self) -> Vec<Route> {
        std::iter::once(Route::Direct)
            .chain(self.proxies.iter().cloned().map(Route::Proxy))
            .collect()
    }

    /// Fetches a page and extracts its content
    ///
    /// # Strategy Order
    ///
    /// 1. Direct request (body must be longer than `min_body_length`)
    /// 2. Each proxy in declared order (body must also be free of
    ///    access-denied markers)
    ///
    /// # Returns
    ///
    /// * `Ok(PageContent)` - Content parsed from the first valid body
    /// * `Err(SpiderError::PageUnreachable)` - Every route failed; lists why
    pub async fn fetch_page_content(&self, url: &str) -> Result<PageContent, SpiderError> {
        let min_length = self.retry.min_body_length;
        let html = self
            .fetch_validated(
                url,
                |route, body| validate_page_body(route, body, min_length),
                &|_: &Route| {},
            )
            .await
            .map_err(|failures| {
                tracing::warn!("All fetch strategies exhausted for {}", url);
                SpiderError::PageUnreachable {
                    url: url.to_string(),
                    failures,
                }
            })?;

        Ok(parse_html_content(&html, url))
    }

    /// Fetches the raw XML of a sitemap document
    ///
    /// Returns `None` when no route produced something that looks like a
    /// sitemap; a missing sitemap is an expected outcome, not an error.
    pub async fn fetch_sitemap_text(&self, url: &str, progress: &dyn ProgressSink) -> Option<String> {
        let announce = |route: &Route| {
            let update = match route {
                Route::Direct => Progress::TryingSitemapDirectly,
                Route::Proxy(proxy) => Progress::TryingProxy {
                    proxy: proxy.name.clone(),
                },
            };
            emit(progress, update);
        };

        match self.fetch_validated(url, validate_sitemap_body, &announce).await {
            Ok(text) => Some(text),
            Err(failures) => {
                tracing::warn!(
                    "All attempts failed for {}: {}",
                    url,
                    crate::crawler::describe_failures(&failures)
                );
                None
            }
        }
    }

    /// Runs the route cascade for `url`, accepting the first body that passes `validate`
    pub async fn fetch_validated<V>(
        &self,
        url: &str,
        validate: V,
        on_route: &(dyn Fn(&Route) + Send + Sync),
    ) -> Result<String, Vec<StrategyFailure>>
    where
        V: Fn(&Route, &str) -> Result<(), AttemptFailure>,
    {
        let proxy_delay = Duration::from_millis(self.retry.proxy_delay_ms);

        first_success(
            self.routes(),
            |previous, next| pause_between(previous, next, proxy_delay),
            |route| {
                on_route(&route);
                self.fetch_body(route, url)
            },
            |route, body: &String| {
                validate(route, body).map_err(|reason| SpiderError::Rejected {
                    url: url.to_string(),
                    reason,
                })
            },
        )
        .await
    }

    async fn fetch_body(&self, route: Route, url: &str) -> Result<String, SpiderError> {
        let (request_url, attempts, backoff) = match &route {
            Route::Direct => (
                url.to_string(),
                self.retry.direct_attempts,
                self.retry.direct_backoff_ms,
            ),
            Route::Proxy(proxy) => (
                proxy.proxy_url(url),
                self.retry.proxy_attempts,
                self.retry.proxy_backoff_ms,
            ),
        };

        tracing::debug!("Attempting {} via {}", url, route.name());

        let response = fetch_with_retry(
            &self.client,
            &request_url,
            attempts,
            Duration::from_millis(backoff),
        )
        .await?;

        let body = read_body(response)
            .await
            .map_err(|reason| SpiderError::Rejected {
                url: request_url.clone(),
                reason,
            })?;

        tracing::debug!("{} answered {} characters via {}", url, body.len(), route.name());
        Ok(body)
    }
}

/// Relays are paced against each other; moving from the direct route to the first relay is immediate
fn pause_between(previous: &Route, next: &Route, proxy_delay: Duration) -> Duration {
    match (previous, next) {
        (Route::Proxy(_), Route::Proxy(_)) => proxy_delay,
        _ => Duration::ZERO,
    }
}

/// Accepts page bodies longer than `min_length`; relayed bodies must also not be block pages
pub fn validate_page_body(route: &Route, body: &str, min_length: usize) -> Result<(), AttemptFailure> {
    let length = body.chars().count();
    if length <= min_length {
        return Err(AttemptFailure::EmptyBody { length });
    }

    if let Route::Proxy(_) = route {
        if let Some(marker) = ACCESS_DENIED_MARKERS
            .iter()
            .copied()
            .find(|marker| body.contains(marker))
        {
            return Err(AttemptFailure::AccessDenied { marker });
        }
    }

    Ok(())
}

/// Accepts bodies that look like sitemap XML
pub fn validate_sitemap_body(_route: &Route, body: &str) -> Result<(), AttemptFailure> {
    if SITEMAP_MARKERS.iter().any(|marker| body.contains(marker)) {
        Ok(())
    } else {
        Err(AttemptFailure::NotSitemap)
    }
}
