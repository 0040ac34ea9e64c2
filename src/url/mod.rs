//! URL handling module for SpellSpider
//!
//! This module provides target URL parsing, origin comparison and the
//! resource-extension filter shared by link extraction and sitemap parsing.

mod filter;
mod origin;

pub use filter::{is_discoverable, is_resource_path, RESOURCE_EXTENSIONS};
pub use origin::{origin_of, same_origin};

use crate::{UrlError, UrlResult};
use url::Url;

/// Parses a user-supplied target URL
///
/// Only absolute `http`/`https` URLs with a host are accepted.
///
/// # Examples
///
/// ```
/// use spellspider::url::parse_target;
///
/// let url = parse_target("https://example.com").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/");
/// assert!(parse_target("example.com").is_err());
/// ```
pub fn parse_target(target: &str) -> UrlResult<Url> {
    let url = Url::parse(target.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", target, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost(target.to_string()));
    }

    Ok(url)
}

/// Turns what a user typed into a target URL
///
/// Input without a scheme gets `https://` prepended, so `example.com` becomes
/// `https://example.com`. Input that already names a scheme is returned
/// trimmed and unchanged; [`parse_target`] still decides whether it is valid.
///
/// # Examples
///
/// ```
/// use spellspider::url::normalize_target;
///
/// assert_eq!(normalize_target(" example.com/about "), "https://example.com/about");
/// assert_eq!(normalize_target("http://example.com"), "http://example.com");
/// ```
pub fn normalize_target(input: &str) -> String {
    let input = input.trim();
    if input.is_empty() || input.contains("://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    }
}

/// Returns the last path segment of a URL, for display
///
/// Falls back to the full URL when it has no non-empty segment.
pub fn file_name(url: &str) -> &str {
    match url.trim_end_matches('/').rsplit('/').next() {
        Some(segment) if !segment.is_empty() && !segment.contains(':') => segment,
        _ => url,
    }
}
