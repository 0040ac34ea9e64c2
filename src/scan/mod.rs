//! Page scanning
//!
//! A scan fetches each selected page through the [`PageFetcher`] cascade and
//! hands its text to an [`Analyzer`]. Pages fail independently: an unreachable
//! page or a failed analysis marks that page `Failed` and the scan moves on.
//! A scan can be stopped between pages; pages it never reached stay `Pending`.

mod analysis;
mod status;

pub use analysis::{
    truncate_for_analysis, Analysis, Analyzer, ErrorEntry, IssueKind, Severity,
    MAX_ANALYSIS_CHARS,
};
pub use status::ScanStatus;

use crate::crawler::PageFetcher;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// Title given to a page that no route could fetch
pub const ACCESS_DENIED_TITLE: &str = "Access Denied";

/// Title given to a page whose text could not be analysed
pub const ANALYSIS_FAILED_TITLE: &str = "Analysis Failed";

/// Outcome of scanning one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageScanResult {
    pub url: String,
    pub title: String,
    pub status: ScanStatus,
    pub errors: Vec<ErrorEntry>,
    pub scanned_at: DateTime<Utc>,
    pub word_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Why the page failed, for `Failed` results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl PageScanResult {
    /// A page selected for scanning but not yet reached
    pub fn pending(url: &str) -> Self {
        Self {
            url: url.to_string(),
            title: url.to_string(),
            status: ScanStatus::Pending,
            errors: Vec::new(),
            scanned_at: Utc::now(),
            word_count: 0,
            score: None,
            summary: None,
            failure: None,
        }
    }

    fn failed(url: &str, title: &str, word_count: usize, reason: String) -> Self {
        Self {
            title: title.to_string(),
            status: ScanStatus::Failed,
            word_count,
            failure: Some(reason),
            ..Self::pending(url)
        }
    }
}

/// Scans one page; never returns an error
pub async fn scan_page(fetcher: &PageFetcher, analyzer: &dyn Analyzer, url: &str) -> PageScanResult {
    let page = match fetcher.fetch_page_content(url).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!("Scan of {} failed: {}", url, e);
            return PageScanResult::failed(url, ACCESS_DENIED_TITLE, 0, e.to_string());
        }
    };

    let word_count = page.word_count();

    match analyzer.analyze(truncate_for_analysis(&page.text)).await {
        Ok(analysis) => {
            tracing::info!(
                "Scanned {}: {} issue(s), score {}",
                url,
                analysis.errors.len(),
                analysis.score
            );
            PageScanResult {
                url: url.to_string(),
                title: page.title,
                status: ScanStatus::Completed,
                errors: analysis.errors,
                scanned_at: Utc::now(),
                word_count,
                score: Some(analysis.score.min(100)),
                summary: Some(analysis.summary),
                failure: None,
            }
        }
        Err(e) => {
            tracing::warn!("Analysis of {} failed: {}", url, e);
            PageScanResult::failed(url, ANALYSIS_FAILED_TITLE, word_count, e.to_string())
        }
    }
}

/// Scans pages one after another, reporting each result as it completes
///
/// `stop` is checked before each page. Once it is set, the remaining pages
/// are returned as `Pending` without being fetched or reported.
pub async fn scan_pages<F>(
    fetcher: &PageFetcher,
    analyzer: &dyn Analyzer,
    urls: &[String],
    stop: &AtomicBool,
    mut on_result: F,
) -> Vec<PageScanResult>
where
    F: FnMut(&PageScanResult),
{
    let mut results = Vec::with_capacity(urls.len());

    for (index, url) in urls.iter().enumerate() {
        if stop.load(Ordering::SeqCst) {
            tracing::info!("Scan stopped with {} page(s) left", urls.len() - index);
            results.extend(urls[index..].iter().map(|url| PageScanResult::pending(url)));
            break;
        }

        let result = scan_page(fetcher, analyzer, url).await;
        on_result(&result);
        results.push(result);
    }

    results
}

/// Aggregate figures for a finished scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSummary {
    pub pages_scanned: usize,
    pub pages_failed: usize,
    pub total_errors: usize,
    /// Mean score over completed pages
    pub average_score: Option<f64>,
}

impl ScanSummary {
    pub fn from_results(results: &[PageScanResult]) -> Self {
        let scores: Vec<f64> = results
            .iter()
            .filter_map(|r| r.score)
            .map(f64::from)
            .collect();

        let average_score = if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        };

        Self {
            pages_scanned: results
                .iter()
                .filter(|r| r.status == ScanStatus::Completed)
                .count(),
            pages_failed: results
                .iter()
                .filter(|r| r.status == ScanStatus::Failed)
                .count(),
            total_errors: results.iter().map(|r| r.errors.len()).sum(),
            average_score,
        }
    }
}
