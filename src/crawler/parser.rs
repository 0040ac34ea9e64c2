//! HTML parser for extracting page text and links
//!
//! This module handles parsing HTML content to extract:
//! - The editorial text of a page (boilerplate elements stripped)
//! - Page title and meta description
//! - Same-origin links to other pages

use crate::url::is_discoverable;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements whose content is never part of the analysed text
const BOILERPLATE_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "header", "footer", "nav", "aside",
];

/// Text content extracted from one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    /// Meta description and body text, whitespace-normalized
    pub text: String,

    /// The raw HTML, kept for link extraction
    pub html: String,

    /// Document title, or the source URL when the page has none
    pub title: String,
}

impl PageContent {
    /// Number of whitespace-separated words in the text
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Parses HTML content into its analysable text
///
/// # Extraction Rules
///
/// - `script, style, noscript, iframe, svg, header, footer, nav, aside`
///   subtrees are skipped entirely
/// - Body text has every whitespace run collapsed to a single space
/// - A non-empty `<meta name="description">` is prepended, separated by a
///   blank line
/// - Title falls back to `source_url` when missing or blank
///
/// # Example
///
/// ```
/// use spellspider::crawler::parse_html_content;
///
/// let html = r#"<html><head><title>Home</title></head>
///     <body><nav>Menu</nav><p>Hello   world</p></body></html>"#;
/// let page = parse_html_content(html, "https://example.com/");
/// assert_eq!(page.title, "Home");
/// assert_eq!(page.text, "Hello world");
/// ```
pub fn parse_html_content(html: &str, source_url: &str) -> PageContent {
    let document = Html::parse_document(html);

    let title = extract_title(&document).unwrap_or_else(|| source_url.to_string());
    let description = extract_meta_description(&document);
    let body_text = extract_body_text(&document);

    let text = match description {
        Some(description) => format!("{}\n\n{}", description, body_text),
        None => body_text,
    };

    PageContent {
        text,
        html: html.to_string(),
        title,
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

/// Extracts the content of `<meta name="description">`
fn extract_meta_description(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"meta[name="description"]"#).ok()?;

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}

/// Collects the text of `<body>`, skipping boilerplate subtrees
fn extract_body_text(document: &Html) -> String {
    let mut raw = String::new();

    if let Ok(body_selector) = Selector::parse("body") {
        if let Some(body) = document.select(&body_selector).next() {
            collect_text(body, &mut raw);
        }
    }

    collapse_whitespace(&raw)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if BOILERPLATE_ELEMENTS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
            }
            _ => {}
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts same-origin page links from HTML
///
/// Every `<a href>` is resolved against `base_url`. A link is kept only if it
/// has the same origin as `base_url`, carries no fragment and does not point
/// at a resource file (pdf, jpg, png, gif, zip). Hrefs that cannot be
/// resolved are skipped.
///
/// # Arguments
///
/// * `html` - The HTML content
/// * `base_url` - The URL the HTML was fetched from
///
/// # Returns
///
/// The deduplicated set of absolute URLs
pub fn extract_links(html: &str, base_url: &Url) -> HashSet<String> {
    let document = Html::parse_document(html);
    let mut links = HashSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.insert(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - Invalid URLs
/// - Other origins (this also drops mailto:, tel:, javascript: and data:)
/// - URLs with a fragment
/// - Resource files
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let absolute_url = base_url.join(href.trim()).ok()?;

    if is_discoverable(&absolute_url, base_url) {
        Some(absolute_url.to_string())
    } else {
        None
    }
}
