use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;

/// Bytes escaped in a URL component: everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
const URL_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Main configuration structure for SpellSpider
///
/// Every section is optional in the TOML file; omitted values fall back to
/// the built-in defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub sitemap: SitemapConfig,
    /// Relay proxies, tried in the order they are declared
    #[serde(rename = "proxy", default = "default_proxies")]
    pub proxies: Vec<ProxyConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            retry: RetryConfig::default(),
            sitemap: SitemapConfig::default(),
            proxies: default_proxies(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Overall per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("SpellSpider/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Retry and validation settings for the fetch cascade
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts made against the target itself
    #[serde(rename = "direct-attempts")]
    pub direct_attempts: u32,

    /// Backoff base for direct attempts (milliseconds)
    #[serde(rename = "direct-backoff-ms")]
    pub direct_backoff_ms: u64,

    /// Attempts made against each proxy
    #[serde(rename = "proxy-attempts")]
    pub proxy_attempts: u32,

    /// Backoff base for proxy attempts (milliseconds)
    #[serde(rename = "proxy-backoff-ms")]
    pub proxy_backoff_ms: u64,

    /// Pause between two consecutive relay proxies (milliseconds)
    #[serde(rename = "proxy-delay-ms")]
    pub proxy_delay_ms: u64,

    /// A page body must be longer than this many characters to be accepted
    #[serde(rename = "min-body-length")]
    pub min_body_length: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            direct_attempts: 1,
            direct_backoff_ms: 500,
            proxy_attempts: 2,
            proxy_backoff_ms: 800,
            proxy_delay_ms: 300,
            min_body_length: 50,
        }
    }
}

/// Sitemap discovery settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    /// Root sitemap paths, tried in order until one yields URLs
    pub candidates: Vec<String>,

    /// Maximum nesting of sitemap indexes below a root sitemap
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of sitemap documents fetched in one discovery run
    #[serde(rename = "max-documents")]
    pub max_documents: usize,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            candidates: vec![
                "/sitemap.xml".to_string(),
                "/sitemap_index.xml".to_string(),
                "/page-sitemap.xml".to_string(),
            ],
            max_depth: 8,
            max_documents: 500,
        }
    }
}

/// A public CORS relay proxy
///
/// The template contains `{url}` (replaced by the percent-encoded target) or
/// `{raw_url}` (replaced by the target verbatim).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProxyConfig {
    pub name: String,
    pub template: String,
}

impl ProxyConfig {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
        }
    }

    /// Builds the relay URL that fetches `target` through this proxy
    ///
    /// # Example
    ///
    /// ```
    /// use spellspider::config::ProxyConfig;
    ///
    /// let proxy = ProxyConfig::new("AllOrigins", "https://api.allorigins.win/raw?url={url}");
    /// assert_eq!(
    ///     proxy.proxy_url("https://example.com/a b"),
    ///     "https://api.allorigins.win/raw?url=https%3A%2F%2Fexample.com%2Fa%20b"
    /// );
    /// ```
    pub fn proxy_url(&self, target: &str) -> String {
        let encoded = utf8_percent_encode(target, URL_COMPONENT).to_string();
        self.template
            .replace("{raw_url}", target)
            .replace("{url}", &encoded)
    }
}

/// The built-in relay list, most reliable first
pub fn default_proxies() -> Vec<ProxyConfig> {
    vec![
        ProxyConfig::new("AllOrigins", "https://api.allorigins.win/raw?url={url}"),
        ProxyConfig::new("CorsProxy", "https://corsproxy.io/?{url}"),
        ProxyConfig::new("ThingProxy", "https://thingproxy.freeboard.io/fetch/{url}"),
        ProxyConfig::new("ProxyCors", "https://proxy.cors.sh/{raw_url}"),
    ]
}
