use url::Url;

/// File extensions that mark a URL as a downloadable resource rather than a page
pub const RESOURCE_EXTENSIONS: &[&str] = &["pdf", "jpg", "png", "gif", "zip"];

/// Checks whether a URL path ends in a resource extension (case-insensitive)
pub fn is_resource_path(path: &str) -> bool {
    let last = path.rsplit('/').next().unwrap_or(path);
    match last.rsplit_once('.') {
        Some((_, ext)) => RESOURCE_EXTENSIONS
            .iter()
            .any(|candidate| ext.eq_ignore_ascii_case(candidate)),
        None => false,
    }
}

/// Checks whether a resolved URL may enter the discovered page set
///
/// Same origin as `base`, no fragment, and not a resource file.
pub fn is_discoverable(url: &Url, base: &Url) -> bool {
    url.origin() == base.origin() && url.fragment().is_none() && !is_resource_path(url.path())
}
