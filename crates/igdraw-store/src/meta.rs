use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the currently served campaign set came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncSource {
    Sheet,
    #[default]
    Fallback,
}

impl fmt::Display for SyncSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncSource::Sheet => write!(f, "sheet"),
            SyncSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// Diagnostics about the last campaign sync, exposed on `/health`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMeta {
    pub last_sync: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub source: SyncSource,
    pub row_count: usize,
    pub shortcodes: Vec<String>,
    pub last_duration_ms: Option<u64>,
    pub total_comments: u64,
    pub sample: Vec<String>,
}
