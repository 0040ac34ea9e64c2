//! Discovery coordinator - top-level URL discovery
//!
//! Discovery runs a fixed sequence of phases and never fails once the target
//! URL parses:
//! 1. Sitemap phase - read the site's sitemaps
//! 2. Crawl phase - fetch the target page and collect its same-origin links
//! 3. Degraded - return the target URL alone

use crate::config::{Config, SitemapConfig};
use crate::crawler::cascade::{describe_failures, first_success, no_pause, Strategy};
use crate::crawler::page_fetcher::PageFetcher;
use crate::crawler::parser::extract_links;
use crate::crawler::progress::{emit, Progress, ProgressSink};
use crate::crawler::sitemap::SitemapResolver;
use crate::url::parse_target;
use crate::SpiderError;
use std::collections::BTreeSet;
use url::Url;

/// A discovery phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Sitemap,
    Crawl,
}

impl Strategy for Phase {
    fn name(&self) -> &str {
        match self {
            Self::Sitemap => "Sitemap discovery",
            Self::Crawl => "Homepage crawl",
        }
    }
}

/// Discovers the pages of a site
pub struct Discoverer {
    fetcher: PageFetcher,
    sitemap: SitemapConfig,
}

impl Discoverer {
    /// Creates a discoverer over an existing fetcher
    pub fn new(fetcher: PageFetcher, sitemap: SitemapConfig) -> Self {
        Self { fetcher, sitemap }
    }

    /// Creates a discoverer from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Discoverer)` - Ready to discover
    /// * `Err(SpiderError)` - The HTTP client could not be built
    pub fn from_config(config: &Config) -> Result<Self, SpiderError> {
        Ok(Self::new(
            PageFetcher::from_config(config)?,
            config.sitemap.clone(),
        ))
    }

    /// The page fetcher used for discovery, reusable for scanning
    pub fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    /// Discovers the URLs of the site that `target_url` belongs to
    ///
    /// # Returns
    ///
    /// * `Ok(urls)` - Lexically sorted, deduplicated, same-origin URLs; never
    ///   empty, since the degraded outcome is the target URL alone
    /// * `Err(SpiderError::Url)` - `target_url` is not an absolute http(s) URL
    pub async fn discover_urls(
        &self,
        target_url: &str,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<String>, SpiderError> {
        let target_url = target_url.trim();
        let target = parse_target(target_url)?;

        tracing::info!("Starting URL discovery for: {}", target_url);

        let outcome = first_success(
            [Phase::Sitemap, Phase::Crawl],
            no_pause,
            |phase| self.run_phase(phase, target_url, &target, progress),
            |phase, urls: &Vec<String>| {
                if urls.is_empty() {
                    Err(SpiderError::NothingDiscovered {
                        phase: phase.name().to_string(),
                    })
                } else {
                    Ok(())
                }
            },
        )
        .await;

        match outcome {
            Ok(urls) => Ok(urls),
            Err(failures) => {
                tracing::warn!(
                    "Discovery degraded to target URL only: {}",
                    describe_failures(&failures)
                );
                emit(
                    progress,
                    Progress::UsingTargetOnly {
                        url: target_url.to_string(),
                    },
                );
                Ok(vec![target_url.to_string()])
            }
        }
    }

    async fn run_phase(
        &self,
        phase: Phase,
        target_url: &str,
        target: &Url,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<String>, SpiderError> {
        match phase {
            Phase::Sitemap => {
                emit(progress, Progress::SearchingSitemaps);

                let urls = SitemapResolver::new(&self.fetcher, &self.sitemap)
                    .resolve_sitemap_urls(target, progress)
                    .await;

                if urls.is_empty() {
                    tracing::info!("No sitemap found or sitemap was empty");
                    emit(progress, Progress::FallingBackToCrawl);
                } else {
                    tracing::info!("Discovered {} URLs via sitemap", urls.len());
                    emit(progress, Progress::SitemapUrlsFound { count: urls.len() });
                }

                Ok(urls.into_iter().collect())
            }
            Phase::Crawl => {
                emit(
                    progress,
                    Progress::CrawlingHomepage {
                        url: target_url.to_string(),
                    },
                );

                let page = self.fetcher.fetch_page_content(target_url).await?;

                let mut urls: BTreeSet<String> =
                    extract_links(&page.html, target).into_iter().collect();
                urls.insert(target_url.to_string());

                tracing::info!("Found {} URLs via homepage crawl", urls.len());
                emit(progress, Progress::HomepageLinksFound { count: urls.len() });

                Ok(urls.into_iter().collect())
            }
        }
    }
}
