use url::Url;

/// Returns the serialized origin (scheme, host and port) of a URL
///
/// # Examples
///
/// ```
/// use spellspider::url::origin_of;
/// use url::Url;
///
/// let url = Url::parse("https://Example.com:443/a/b?c").unwrap();
/// assert_eq!(origin_of(&url), "https://example.com");
/// ```
pub fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Checks whether `candidate` parses to the same origin as `base`
///
/// Unparseable candidates are never same-origin.
pub fn same_origin(candidate: &str, base: &Url) -> bool {
    match Url::parse(candidate) {
        Ok(url) => url.origin() == base.origin(),
        Err(_) => false,
    }
}
