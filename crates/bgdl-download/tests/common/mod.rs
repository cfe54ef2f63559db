//! Shared fixtures for coordinator integration tests.
//!
//! `FakeEngine` keeps its queue table in memory. Tests drive transfers to a
//! terminal state by hand, optionally writing the temp file and optionally
//! broadcasting the completion signal.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::sync::broadcast;

use bgdl_core::{
    DownloadCallback, DownloadError, DownloadOutcome, StatusMask, TransferEnginePort, TransferId,
    TransferRequest, TransferRow, TransferSnapshot, TransferStatus,
};
use bgdl_download::{CoordinatorConfig, CoordinatorDeps, LifecycleCoordinator, build_coordinator};

struct Row {
    request: TransferRequest,
    status: TransferStatus,
    reason: i32,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: BTreeMap<TransferId, Row>,
    requests: Vec<TransferRequest>,
    cancelled: Vec<TransferId>,
    fail_enqueue: Option<DownloadError>,
}

/// In-memory transfer engine.
pub struct FakeEngine {
    inner: Mutex<Inner>,
    tx: broadcast::Sender<TransferId>,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        let (tx, _) = broadcast::channel(16);
        Arc::new(Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                ..Inner::default()
            }),
            tx,
        })
    }

    /// Every request the engine accepted, in order.
    pub fn requests(&self) -> Vec<TransferRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> TransferRequest {
        self.requests().pop().expect("no request enqueued")
    }

    /// Every id passed to `cancel`, in order.
    pub fn cancelled(&self) -> Vec<TransferId> {
        self.inner.lock().unwrap().cancelled.clone()
    }

    pub fn has_row(&self, id: TransferId) -> bool {
        self.inner.lock().unwrap().rows.contains_key(&id)
    }

    pub fn row_count(&self) -> usize {
        self.inner.lock().unwrap().rows.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Make subsequent `enqueue` calls fail with `error`.
    pub fn fail_enqueue(&self, error: Option<DownloadError>) {
        self.inner.lock().unwrap().fail_enqueue = error;
    }

    /// Add a row the coordinator never submitted.
    pub fn insert_foreign(&self, uri: &str, status: TransferStatus) -> TransferId {
        let mut inner = self.inner.lock().unwrap();
        let id = TransferId::new(inner.next_id);
        inner.next_id += 1;
        inner.rows.insert(
            id,
            Row {
                request: TransferRequest::new(uri, format!("/foreign/{id}")),
                status,
                reason: 0,
            },
        );
        id
    }

    /// Forget a row without signalling (user removed it from the engine UI).
    pub fn remove_row(&self, id: TransferId) {
        self.inner.lock().unwrap().rows.remove(&id);
    }

    /// Move a row to a terminal state without signalling.
    ///
    /// With `payload`, the bytes are written to the request destination.
    pub fn finish_quietly(
        &self,
        id: TransferId,
        status: TransferStatus,
        reason: i32,
        payload: Option<&[u8]>,
    ) {
        let destination = {
            let mut inner = self.inner.lock().unwrap();
            let row = inner.rows.get_mut(&id).expect("unknown transfer");
            row.status = status;
            row.reason = reason;
            row.request.destination.clone()
        };
        if let Some(bytes) = payload {
            std::fs::write(destination, bytes).unwrap();
        }
    }

    /// Move a row to a terminal state and broadcast the completion.
    pub fn finish(&self, id: TransferId, status: TransferStatus, reason: i32, payload: Option<&[u8]>) {
        self.finish_quietly(id, status, reason, payload);
        self.signal(id);
    }

    pub fn signal(&self, id: TransferId) {
        let _ = self.tx.send(id);
    }
}

#[async_trait]
impl TransferEnginePort for FakeEngine {
    async fn enqueue(&self, request: TransferRequest) -> Result<TransferId, DownloadError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(error) = inner.fail_enqueue.clone() {
            return Err(error);
        }
        if request.destination.exists() {
            return Err(DownloadError::destination_exists(
                request.destination.display().to_string(),
            ));
        }

        let id = TransferId::new(inner.next_id);
        inner.next_id += 1;
        inner.requests.push(request.clone());
        inner.rows.insert(
            id,
            Row {
                request,
                status: TransferStatus::Pending,
                reason: 0,
            },
        );
        Ok(id)
    }

    async fn cancel(&self, id: TransferId) {
        let mut inner = self.inner.lock().unwrap();
        inner.cancelled.push(id);
        inner.rows.remove(&id);
    }

    async fn query_status(&self, id: TransferId) -> Option<TransferSnapshot> {
        let inner = self.inner.lock().unwrap();
        inner.rows.get(&id).map(|row| TransferSnapshot {
            id,
            status: row.status,
            reason: row.reason,
            source_uri: row.request.source_uri.clone(),
        })
    }

    async fn query_by_status(&self, mask: StatusMask) -> Vec<TransferRow> {
        let inner = self.inner.lock().unwrap();
        inner
            .rows
            .iter()
            .filter(|(_, row)| mask.matches(row.status))
            .map(|(id, row)| TransferRow {
                id: *id,
                source_uri: row.request.source_uri.clone(),
                status: row.status,
            })
            .collect()
    }

    fn subscribe_completions(&self) -> broadcast::Receiver<TransferId> {
        self.tx.subscribe()
    }
}

/// Callback that records every outcome it receives.
#[derive(Default)]
pub struct RecordingCallback {
    outcomes: Mutex<Vec<DownloadOutcome>>,
}

impl RecordingCallback {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn outcomes(&self) -> Vec<DownloadOutcome> {
        self.outcomes.lock().unwrap().clone()
    }
}

impl DownloadCallback for RecordingCallback {
    fn success(&self) {
        self.outcomes.lock().unwrap().push(DownloadOutcome::Success);
    }

    fn error(&self, message: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .push(DownloadOutcome::Error(message.to_string()));
    }
}

pub fn error(message: &str) -> DownloadOutcome {
    DownloadOutcome::Error(message.to_string())
}

/// Coordinator over a fresh `FakeEngine` with default configuration.
pub fn coordinator() -> (Arc<LifecycleCoordinator>, Arc<FakeEngine>) {
    coordinator_with(CoordinatorConfig::default())
}

pub fn coordinator_with(config: CoordinatorConfig) -> (Arc<LifecycleCoordinator>, Arc<FakeEngine>) {
    let engine = FakeEngine::new();
    let coordinator = build_coordinator(CoordinatorDeps {
        engine: engine.clone(),
        config,
        runtime: Handle::current(),
    });
    (coordinator, engine)
}

pub fn temp_of(path: &Path) -> PathBuf {
    let mut raw = path.as_os_str().to_owned();
    raw.push(".temp");
    PathBuf::from(raw)
}

/// Poll `condition` until it holds or a second passes.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
