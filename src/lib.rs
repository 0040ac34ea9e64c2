//! SpellSpider: website content discovery for copy auditing
//!
//! This crate discovers the pages of a website and fetches their text so it can
//! be handed to a grammar/style analysis service. Pages are reached through an
//! ordered cascade of strategies (direct fetch, then public CORS relay proxies),
//! and discovery prefers sitemaps before falling back to homepage link extraction.

pub mod config;
pub mod crawler;
pub mod scan;
pub mod url;

use thiserror::Error;

/// Main error type for SpellSpider operations
#[derive(Debug, Error)]
pub enum SpiderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gave up on {url} after {attempts} attempt(s): {last}")]
    FetchExhausted {
        url: String,
        attempts: u32,
        #[source]
        last: crawler::AttemptFailure,
    },

    #[error("Rejected response from {url}: {reason}")]
    Rejected {
        url: String,
        reason: crawler::AttemptFailure,
    },

    #[error(
        "Unable to access {url} after trying {} method(s): {}",
        .failures.len(),
        crawler::describe_failures(.failures)
    )]
    PageUnreachable {
        url: String,
        failures: Vec<crawler::StrategyFailure>,
    },

    #[error("{phase} discovered no URLs")]
    NothingDiscovered { phase: String },

    #[error("Analysis failed: {0}")]
    Analysis(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for SpellSpider operations
pub type Result<T> = std::result::Result<T, SpiderError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{discover_urls, Discoverer, PageContent, PageFetcher, Progress, ProgressSink};
pub use scan::{Analyzer, PageScanResult, ScanStatus};
