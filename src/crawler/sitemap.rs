//! Sitemap discovery
//!
//! Reads `sitemap.org` documents: a `<urlset>` lists pages, a `<sitemapindex>`
//! lists further sitemaps. Indexes are expanded recursively, with all children
//! of one index fetched concurrently.

use crate::config::SitemapConfig;
use crate::crawler::page_fetcher::PageFetcher;
use crate::crawler::progress::{emit, Progress, ProgressSink};
use crate::url::{file_name, is_resource_path, origin_of, same_origin};
use futures::future::{join_all, BoxFuture, FutureExt};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::{BTreeSet, HashSet};
use std::sync::{Mutex, PoisonError};
use url::Url;

/// The `<loc>` entries of one sitemap document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapDocument {
    /// `<sitemap><loc>` entries (non-empty for a sitemap index)
    pub sitemaps: Vec<String>,

    /// `<url><loc>` entries
    pub urls: Vec<String>,
}

impl SitemapDocument {
    /// A document with any nested sitemap entry is treated as an index
    pub fn is_index(&self) -> bool {
        !self.sitemaps.is_empty()
    }
}

/// Parses sitemap XML into its `<loc>` entries
///
/// Namespace prefixes are ignored. Parsing is lenient: on malformed XML the
/// entries read before the error are returned.
pub fn parse_sitemap_xml(xml: &str) -> SitemapDocument {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut document = SitemapDocument::default();
    let mut open: Vec<String> = Vec::new();
    let mut loc = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_ascii_lowercase();
                if name == "loc" {
                    loc.clear();
                }
                open.push(name);
            }
            Ok(Event::End(_)) => {
                if open.pop().as_deref() == Some("loc") {
                    let value = loc.trim();
                    if !value.is_empty() {
                        match open.last().map(String::as_str) {
                            Some("sitemap") => document.sitemaps.push(value.to_string()),
                            Some("url") => document.urls.push(value.to_string()),
                            _ => {}
                        }
                    }
                    loc.clear();
                }
            }
            Ok(Event::Text(e)) => {
                if open.last().map(String::as_str) == Some("loc") {
                    loc.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Ok(Event::CData(e)) => {
                if open.last().map(String::as_str) == Some("loc") {
                    loc.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::warn!(
                    "Sitemap XML error at byte {}: {}",
                    reader.buffer_position(),
                    e
                );
                break;
            }
            _ => {}
        }
    }

    document
}

/// State shared by every fetch of one resolution run
struct SitemapRun<'a> {
    target: &'a Url,
    visited: Mutex<HashSet<String>>,
    progress: &'a dyn ProgressSink,
}

/// Resolves a site's sitemaps into page URLs
pub struct SitemapResolver<'a> {
    fetcher: &'a PageFetcher,
    config: &'a SitemapConfig,
}

impl<'a> SitemapResolver<'a> {
    pub fn new(fetcher: &'a PageFetcher, config: &'a SitemapConfig) -> Self {
        Self { fetcher, config }
    }

    /// Collects page URLs from the first root sitemap location that yields any
    ///
    /// Candidate locations are tried in configured order against the target's
    /// origin. Only same-origin, non-resource URLs are returned.
    pub async fn resolve_sitemap_urls(
        &self,
        target: &Url,
        progress: &dyn ProgressSink,
    ) -> BTreeSet<String> {
        tracing::debug!("Looking for sitemaps on {}", origin_of(target));

        let run = SitemapRun {
            target,
            visited: Mutex::new(HashSet::new()),
            progress,
        };

        for candidate in &self.config.candidates {
            let sitemap_url = match target.join(candidate) {
                Ok(url) => url.to_string(),
                Err(e) => {
                    tracing::warn!("Skipping sitemap candidate {}: {}", candidate, e);
                    continue;
                }
            };

            emit(
                progress,
                Progress::CheckingSitemap {
                    file: file_name(&sitemap_url).to_string(),
                },
            );

            let urls = self.resolve(sitemap_url, &run, 0).await;
            if !urls.is_empty() {
                return urls.into_iter().collect();
            }
        }

        BTreeSet::new()
    }

    /// Fetches one sitemap document and expands it
    fn resolve<'s>(
        &'s self,
        sitemap_url: String,
        run: &'s SitemapRun<'s>,
        depth: u32,
    ) -> BoxFuture<'s, Vec<String>> {
        async move {
            if depth > self.config.max_depth {
                tracing::warn!(
                    "Skipping {}: sitemap nesting exceeds {} levels",
                    sitemap_url,
                    self.config.max_depth
                );
                return Vec::new();
            }

            // Claim the URL before fetching so concurrent siblings never enter it twice
            {
                let mut visited = run.visited.lock().unwrap_or_else(PoisonError::into_inner);
                if visited.contains(&sitemap_url) {
                    tracing::debug!("Sitemap {} already visited", sitemap_url);
                    return Vec::new();
                }
                if visited.len() >= self.config.max_documents {
                    tracing::warn!(
                        "Skipping {}: sitemap document limit ({}) reached",
                        sitemap_url,
                        self.config.max_documents
                    );
                    return Vec::new();
                }
                visited.insert(sitemap_url.clone());
            }

            emit(
                run.progress,
                Progress::ParsingSitemap {
                    file: file_name(&sitemap_url).to_string(),
                },
            );

            let Some(xml) = self.fetcher.fetch_sitemap_text(&sitemap_url, run.progress).await else {
                return Vec::new();
            };

            let document = parse_sitemap_xml(&xml);

            if document.is_index() {
                emit(
                    run.progress,
                    Progress::NestedSitemapsFound {
                        count: document.sitemaps.len(),
                    },
                );

                let nested = document
                    .sitemaps
                    .into_iter()
                    .map(|child| self.resolve(child, run, depth + 1));

                return join_all(nested).await.into_iter().flatten().collect();
            }

            let pages: Vec<String> = document
                .urls
                .into_iter()
                .filter(|loc| is_page_location(loc, run.target))
                .collect();

            tracing::debug!("{} listed {} page(s)", sitemap_url, pages.len());
            pages
        }
        .boxed()
    }
}

/// Keeps sitemap entries on the target's origin that are not resource files
fn is_page_location(loc: &str, target: &Url) -> bool {
    same_origin(loc, target) && Url::parse(loc).map_or(false, |url| !is_resource_path(url.path()))
}
