//! Transfer engine port definition.
//!
//! The engine performs the network fetch, owns its own queue table, and
//! announces finished transfers on a broadcast channel. The coordinator only
//! sees the types below.
//!
//! # Design
//!
//! - Only core download domain types in signatures
//! - `enqueue` is the only fallible call; `cancel` and queries never fail
//! - No HTTP client types leak through

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::download::{DownloadError, StatusMask, TransferId, TransferStatus};

/// Header name used for every cookie entry.
pub const COOKIE_HEADER: &str = "Cookie";

/// Engine-neutral request to transfer one URI to one destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Source URI.
    pub source_uri: String,
    /// Where the engine writes bytes. Must not exist at enqueue time.
    pub destination: PathBuf,
    /// Title shown by engines that have a downloads UI.
    pub title: String,
    /// Whether the transfer is listed in the engine's downloads UI.
    pub visible_in_downloads_ui: bool,
    /// Request headers in insertion order; names may repeat.
    pub headers: Vec<(String, String)>,
}

impl TransferRequest {
    /// Create a hidden, untitled request.
    pub fn new(source_uri: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source_uri: source_uri.into(),
            destination: destination.into(),
            title: String::new(),
            visible_in_downloads_ui: false,
            headers: Vec::new(),
        }
    }

    /// Set the request title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set downloads-UI visibility.
    #[must_use]
    pub const fn with_visible_in_downloads_ui(mut self, visible: bool) -> Self {
        self.visible_in_downloads_ui = visible;
        self
    }

    /// Append a header entry.
    ///
    /// Entries are never merged: adding `Cookie` twice yields two entries.
    pub fn add_header(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), DownloadError> {
        let name = name.into();
        let value = value.into();

        if name.is_empty() || !name.bytes().all(is_token_byte) {
            return Err(DownloadError::invalid_header(name, "invalid header name"));
        }
        if let Some(bad) = value.chars().find(|c| c.is_control() && *c != '\t') {
            return Err(DownloadError::invalid_header(
                name,
                format!("value contains control character {bad:?}"),
            ));
        }

        self.headers.push((name, value));
        Ok(())
    }

    /// Values of every header named `name` (case-insensitive), in order.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

const fn is_token_byte(b: u8) -> bool {
    matches!(b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.'
        | b'^' | b'_' | b'`' | b'|' | b'~'
    ) || b.is_ascii_alphanumeric()
}

/// Point-in-time state of one engine transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferSnapshot {
    pub id: TransferId,
    pub status: TransferStatus,
    /// Engine reason code; meaningful for `Failed`, `0` otherwise.
    pub reason: i32,
    pub source_uri: String,
}

/// One row of a by-status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRow {
    pub id: TransferId,
    pub source_uri: String,
    pub status: TransferStatus,
}

/// Port for the external transfer engine.
///
/// # Usage
///
/// ```ignore
/// let engine: Arc<dyn TransferEnginePort> = /* ... */;
/// let mut finished = engine.subscribe_completions();
/// let id = engine.enqueue(request).await?;
/// while let Ok(done) = finished.recv().await {
///     if done == id { break; }
/// }
/// let snapshot = engine.query_status(id).await;
/// ```
#[async_trait]
pub trait TransferEnginePort: Send + Sync {
    /// Submit a request and return its engine id.
    async fn enqueue(&self, request: TransferRequest) -> Result<TransferId, DownloadError>;

    /// Remove a transfer from the engine. Unknown ids are ignored.
    async fn cancel(&self, id: TransferId);

    /// Snapshot of one transfer; `None` when the engine has no such row.
    async fn query_status(&self, id: TransferId) -> Option<TransferSnapshot>;

    /// Every transfer whose status is selected by `mask`.
    async fn query_by_status(&self, mask: StatusMask) -> Vec<TransferRow>;

    /// Subscribe to "transfer finished" signals carrying the transfer id.
    fn subscribe_completions(&self) -> broadcast::Receiver<TransferId>;
}
