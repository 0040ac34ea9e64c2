//! Progress reporting for discovery
//!
//! Discovery emits structured [`Progress`] events. Their `Display`
//! implementation is the default human-readable rendering; callers that want
//! different wording can match on the variants instead.

use std::fmt;

/// A discovery status update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// Sitemap phase started
    SearchingSitemaps,
    /// About to try one root sitemap location
    CheckingSitemap { file: String },
    /// About to fetch and parse one sitemap document
    ParsingSitemap { file: String },
    /// Fetching a sitemap without a relay
    TryingSitemapDirectly,
    /// Fetching a sitemap through a relay
    TryingProxy { proxy: String },
    /// A sitemap index was found
    NestedSitemapsFound { count: usize },
    /// Sitemap phase finished with results
    SitemapUrlsFound { count: usize },
    /// Sitemap phase produced nothing
    FallingBackToCrawl,
    /// Fetching the target page to extract its links
    CrawlingHomepage { url: String },
    /// Crawl phase finished with results
    HomepageLinksFound { count: usize },
    /// Every phase failed; only the target itself is returned
    UsingTargetOnly { url: String },
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SearchingSitemaps => write!(f, "Searching for sitemaps..."),
            Self::CheckingSitemap { file } => write!(f, "Checking for sitemap at {}", file),
            Self::ParsingSitemap { file } => write!(f, "Parsing sitemap: {}", file),
            Self::TryingSitemapDirectly => write!(f, "Trying to access sitemap directly..."),
            Self::TryingProxy { proxy } => write!(f, "Attempting via {} proxy...", proxy),
            Self::NestedSitemapsFound { count } => {
                write!(f, "Found {} nested sitemap(s), parsing...", count)
            }
            Self::SitemapUrlsFound { count } => write!(f, "Discovered {} URLs via sitemap", count),
            Self::FallingBackToCrawl => {
                write!(f, "No sitemap found, falling back to homepage link extraction...")
            }
            Self::CrawlingHomepage { url } => write!(f, "Scanning {} for links...", url),
            Self::HomepageLinksFound { count } => {
                write!(f, "Found {} URLs via homepage crawl", count)
            }
            Self::UsingTargetOnly { url } => {
                write!(f, "Could not list pages; continuing with {} only", url)
            }
        }
    }
}

/// Receives progress updates
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: Progress);
}

impl<F> ProgressSink for F
where
    F: Fn(Progress) + Send + Sync,
{
    fn report(&self, progress: Progress) {
        self(progress)
    }
}

/// Discards all progress updates
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: Progress) {}
}

/// Logs an update at debug level and forwards it to the sink
pub(crate) fn emit(sink: &dyn ProgressSink, progress: Progress) {
    tracing::debug!("{}", progress);
    sink.report(progress);
}
