//! Registry snapshot DTOs for bridge replies and logs.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::DownloadRecord;
use super::types::TransferId;

/// Serializable view of one download record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadSummary {
    /// Engine id; absent for paused records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<TransferId>,
    pub source_uri: String,
    pub final_path: PathBuf,
    pub created_at: DateTime<Utc>,
}

impl From<&DownloadRecord> for DownloadSummary {
    fn from(record: &DownloadRecord) -> Self {
        Self {
            transfer_id: record.transfer_id(),
            source_uri: record.source_uri().to_string(),
            final_path: record.final_path().to_path_buf(),
            created_at: record.created_at(),
        }
    }
}

/// Active and paused downloads at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Downloads currently submitted to the engine, ordered by transfer id.
    pub active: Vec<DownloadSummary>,
    /// Downloads that were forcibly stopped, in resume order.
    pub paused: Vec<DownloadSummary>,
}

impl RegistrySnapshot {
    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    /// Whether a download for `uri` is currently active.
    pub fn is_active(&self, uri: &str) -> bool {
        self.active.iter().any(|d| d.source_uri == uri)
    }
}
