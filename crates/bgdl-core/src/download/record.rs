//! The download record: one caller request tracked by the coordinator.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::ports::DownloadCallback;

use super::types::TransferId;

/// Suffix appended to the final path to form the engine's write target.
pub const DEFAULT_TEMP_SUFFIX: &str = ".temp";

/// A single download request and its runtime state.
///
/// Identity (`source_uri`, `final_path`, `temp_path`, cookies) never changes.
/// `transfer_id` is `None` until the engine accepts the request, and is
/// cleared again when the record is moved to the paused list.
pub struct DownloadRecord {
    source_uri: String,
    final_path: PathBuf,
    temp_path: PathBuf,
    cookies: Vec<String>,
    created_at: DateTime<Utc>,
    transfer_id: Option<TransferId>,
    callback: Arc<dyn DownloadCallback>,
}

impl DownloadRecord {
    /// Create a record with the default `.temp` suffix.
    pub fn new(
        source_uri: impl Into<String>,
        final_path: impl Into<PathBuf>,
        cookies: Vec<String>,
        callback: Arc<dyn DownloadCallback>,
    ) -> Self {
        Self::with_temp_suffix(source_uri, final_path, DEFAULT_TEMP_SUFFIX, cookies, callback)
    }

    /// Create a record whose temp path is `final_path + suffix`.
    pub fn with_temp_suffix(
        source_uri: impl Into<String>,
        final_path: impl Into<PathBuf>,
        suffix: &str,
        cookies: Vec<String>,
        callback: Arc<dyn DownloadCallback>,
    ) -> Self {
        let final_path = final_path.into();
        let temp_path = temp_path_for(&final_path, suffix);
        Self {
            source_uri: source_uri.into(),
            final_path,
            temp_path,
            cookies,
            created_at: Utc::now(),
            transfer_id: None,
            callback,
        }
    }

    pub fn source_uri(&self) -> &str {
        &self.source_uri
    }

    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Cookie values captured when the record was created.
    pub fn cookies(&self) -> &[String] {
        &self.cookies
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn transfer_id(&self) -> Option<TransferId> {
        self.transfer_id
    }

    pub fn callback(&self) -> &Arc<dyn DownloadCallback> {
        &self.callback
    }

    /// Record the id the engine assigned on enqueue.
    pub const fn assign(&mut self, id: TransferId) {
        self.transfer_id = Some(id);
    }

    /// Forget the engine id (the transfer was removed from the engine).
    pub const fn clear_transfer_id(&mut self) {
        self.transfer_id = None;
    }
}

impl fmt::Debug for DownloadRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadRecord")
            .field("source_uri", &self.source_uri)
            .field("final_path", &self.final_path)
            .field("temp_path", &self.temp_path)
            .field("cookies", &self.cookies.len())
            .field("created_at", &self.created_at)
            .field("transfer_id", &self.transfer_id)
            .finish_non_exhaustive()
    }
}

/// Append `suffix` to the final component of `final_path`.
pub fn temp_path_for(final_path: &Path, suffix: &str) -> PathBuf {
    let mut raw: OsString = final_path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}
