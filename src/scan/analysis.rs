//! Contract of the text analysis service
//!
//! The analysis itself is performed by a hosted language model behind the
//! [`Analyzer`] trait; this crate only defines the data it exchanges.

use crate::SpiderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Longest text (in characters) handed to an analyzer
pub const MAX_ANALYSIS_CHARS: usize = 25_000;

/// Category of a writing issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    Spelling,
    Grammar,
    Style,
    Clarity,
    Tone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// One issue reported by the analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// The offending snippet
    pub original: String,
    pub suggestion: String,
    /// Surrounding text
    pub context: String,
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Result of analysing one text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub errors: Vec<ErrorEntry>,
    /// Quality score, 0 to 100
    pub score: u8,
    pub summary: String,
}

/// A grammar/style/clarity analysis service
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Analyses `text`; failures are reported as [`SpiderError::Analysis`]
    async fn analyze(&self, text: &str) -> Result<Analysis, SpiderError>;
}

/// Cuts `text` to at most [`MAX_ANALYSIS_CHARS`] characters
pub fn truncate_for_analysis(text: &str) -> &str {
    match text.char_indices().nth(MAX_ANALYSIS_CHARS) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
