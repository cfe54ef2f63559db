//! reqwest-backed transfer engine.
//!
//! Each enqueued request becomes one tokio task streaming the response body
//! into its destination. The queue table lives in memory; rows stay until
//! the coordinator cancels them, so a finished transfer can still be queried.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast;
use tokio::task::AbortHandle;
use url::Url;

use bgdl_core::{
    DownloadError, StatusMask, TransferEnginePort, TransferId, TransferRequest, TransferRow,
    TransferSnapshot, TransferStatus,
};

use crate::config::HttpEngineConfig;
use crate::error::TransferError;

struct Row {
    source_uri: String,
    destination: PathBuf,
    status: TransferStatus,
    reason: i32,
    task: Option<AbortHandle>,
}

/// State shared between the engine and its transfer tasks.
struct Shared {
    rows: Mutex<BTreeMap<TransferId, Row>>,
    signals: broadcast::Sender<TransferId>,
}

impl Shared {
    fn rows(&self) -> MutexGuard<'_, BTreeMap<TransferId, Row>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns false if the row was cancelled before the task started.
    fn mark_running(&self, id: TransferId) -> bool {
        self.rows().get_mut(&id).is_some_and(|row| {
            row.status = TransferStatus::Running;
            true
        })
    }

    /// Record the terminal state. Returns false if the row is gone.
    fn finish(&self, id: TransferId, status: TransferStatus, reason: i32) -> bool {
        self.rows().get_mut(&id).is_some_and(|row| {
            row.status = status;
            row.reason = reason;
            row.task = None;
            true
        })
    }
}

/// Transfer engine performing plain HTTP(S) GETs.
pub struct HttpTransferEngine {
    client: reqwest::Client,
    shared: Arc<Shared>,
    next_id: AtomicI64,
}

impl HttpTransferEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: &HttpEngineConfig) -> Result<Self, DownloadError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| DownloadError::other(format!("failed to create HTTP client: {e}")))?;
        let (signals, _) = broadcast::channel(config.signal_capacity.max(1));

        Ok(Self {
            client,
            shared: Arc::new(Shared {
                rows: Mutex::new(BTreeMap::new()),
                signals,
            }),
            next_id: AtomicI64::new(1),
        })
    }

    /// Number of rows in the queue table, terminal ones included.
    pub fn row_count(&self) -> usize {
        self.shared.rows().len()
    }
}

impl Drop for HttpTransferEngine {
    fn drop(&mut self) {
        for row in self.shared.rows().values_mut() {
            if let Some(task) = row.task.take() {
                task.abort();
            }
        }
    }
}

#[async_trait]
impl TransferEnginePort for HttpTransferEngine {
    async fn enqueue(&self, request: TransferRequest) -> Result<TransferId, DownloadError> {
        let url = parse_source(&request.source_uri)?;
        let file = create_destination(&request.destination).await?;

        let mut builder = self.client.get(url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let id = TransferId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.shared.rows().insert(
            id,
            Row {
                source_uri: request.source_uri.clone(),
                destination: request.destination.clone(),
                status: TransferStatus::Pending,
                reason: 0,
                task: None,
            },
        );

        let task = tokio::spawn(run_transfer(id, builder, file, Arc::clone(&self.shared)));
        if let Some(row) = self.shared.rows().get_mut(&id) {
            if !row.status.is_terminal() {
                row.task = Some(task.abort_handle());
            }
        }

        tracing::info!(
            target: "bgdl.http",
            transfer_id = %id,
            uri = %request.source_uri,
            destination = %request.destination.display(),
            title = %request.title,
            headers = request.headers.len(),
            "Transfer enqueued"
        );
        Ok(id)
    }

    async fn cancel(&self, id: TransferId) {
        let removed = self.shared.rows().remove(&id);
        if let Some(row) = removed {
            if let Some(task) = row.task {
                task.abort();
            }
            tracing::debug!(
                target: "bgdl.http",
                transfer_id = %id,
                destination = %row.destination.display(),
                status = %row.status,
                "Transfer removed"
            );
        }
    }

    async fn query_status(&self, id: TransferId) -> Option<TransferSnapshot> {
        self.shared.rows().get(&id).map(|row| TransferSnapshot {
            id,
            status: row.status,
            reason: row.reason,
            source_uri: row.source_uri.clone(),
        })
    }

    async fn query_by_status(&self, mask: StatusMask) -> Vec<TransferRow> {
        self.shared
            .rows()
            .iter()
            .filter(|(_, row)| mask.matches(row.status))
            .map(|(id, row)| TransferRow {
                id: *id,
                source_uri: row.source_uri.clone(),
                status: row.status,
            })
            .collect()
    }

    fn subscribe_completions(&self) -> broadcast::Receiver<TransferId> {
        self.shared.signals.subscribe()
    }
}

/// Accept only absolute http(s) URLs.
fn parse_source(uri: &str) -> Result<Url, DownloadError> {
    let url = Url::parse(uri).map_err(|_| DownloadError::invalid_uri(uri))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(DownloadError::invalid_uri(uri)),
    }
}

/// Create the destination, refusing to overwrite an existing file.
async fn create_destination(path: &Path) -> Result<File, DownloadError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DownloadError::from_io_error(&e))?;
    }

    tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(|e| {
            if e.kind() == io::ErrorKind::AlreadyExists {
                DownloadError::destination_exists(path.display().to_string())
            } else {
                DownloadError::from_io_error(&e)
            }
        })
}

async fn run_transfer(
    id: TransferId,
    request: reqwest::RequestBuilder,
    file: File,
    shared: Arc<Shared>,
) {
    if !shared.mark_running(id) {
        return;
    }

    let (status, reason) = match fetch(request, file).await {
        Ok(written) => {
            tracing::info!(target: "bgdl.http", transfer_id = %id, bytes = written, "Transfer finished");
            (TransferStatus::Successful, 0)
        }
        Err(e) => {
            let reason = e.reason();
            tracing::warn!(target: "bgdl.http", transfer_id = %id, reason, error = %e, "Transfer failed");
            (TransferStatus::Failed, reason)
        }
    };

    if shared.finish(id, status, reason) {
        // No subscribers is fine; the row stays queryable.
        let _ = shared.signals.send(id);
    }
}

/// Stream the response body into `file`, returning the bytes written.
async fn fetch(request: reqwest::RequestBuilder, mut file: File) -> Result<u64, TransferError> {
    let response = request.send().await.map_err(TransferError::from_request)?;

    let status = response.status();
    if !status.is_success() {
        return Err(TransferError::from_status(status.as_u16()));
    }

    let mut written: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(TransferError::Body)?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_http_urls_are_accepted() {
        assert!(parse_source("https://example.com/a.bin").is_ok());
        assert!(parse_source("http://127.0.0.1:8080/a").is_ok());
        assert_eq!(
            parse_source("ftp://example.com/a").unwrap_err(),
            DownloadError::invalid_uri("ftp://example.com/a")
        );
        assert!(matches!(
            parse_source("not a url"),
            Err(DownloadError::InvalidUri { .. })
        ));
    }

    #[tokio::test]
    async fn destination_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("file.temp");

        let file = create_destination(&path).await.unwrap();
        drop(file);
        let err = create_destination(&path).await.unwrap_err();

        assert!(matches!(err, DownloadError::DestinationExists { .. }));
    }
}
