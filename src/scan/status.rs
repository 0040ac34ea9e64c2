//! Scan status definitions for tracking per-page progress

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the current state of a page in a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    /// Page was selected but not yet started
    Pending,

    /// Page is being fetched or analysed
    Processing,

    /// Page was fetched and analysed
    Completed,

    /// Page could not be fetched or analysed
    Failed,
}

impl ScanStatus {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
