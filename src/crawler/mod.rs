//! Crawler module for page discovery and content fetching
//!
//! This module contains the core discovery logic, including:
//! - HTTP fetching with retry logic
//! - The direct-then-proxies fetch cascade
//! - HTML text and link extraction
//! - Recursive sitemap resolution
//! - Overall discovery coordination

mod cascade;
mod coordinator;
mod fetcher;
mod page_fetcher;
mod parser;
mod progress;
mod sitemap;

pub use cascade::{describe_failures, first_success, no_pause, Strategy, StrategyFailure};
pub use coordinator::Discoverer;
pub use fetcher::{build_http_client, fetch_with_retry, read_body, AttemptFailure};
pub use page_fetcher::{validate_page_body, validate_sitemap_body, PageFetcher, Route};
pub use parser::{extract_links, parse_html_content, PageContent};
pub use progress::{NoProgress, Progress, ProgressSink};
pub use sitemap::{parse_sitemap_xml, SitemapDocument, SitemapResolver};

use crate::config::Config;
use crate::SpiderError;

/// Discovers the pages of a site
///
/// This is the main entry point for discovery. It will:
/// 1. Build the HTTP client from the configuration
/// 2. Look for sitemaps at the configured candidate paths
/// 3. Fall back to the links on the target page
/// 4. Fall back to the target URL alone
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `target_url` - Any URL on the site to audit
/// * `progress` - Receives status updates
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Sorted URLs, never empty
/// * `Err(SpiderError)` - The target URL is invalid or the client could not be built
pub async fn discover_urls(
    config: &Config,
    target_url: &str,
    progress: &dyn ProgressSink,
) -> Result<Vec<String>, SpiderError> {
    Discoverer::from_config(config)?
        .discover_urls(target_url, progress)
        .await
}
