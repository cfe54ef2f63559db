//! Transfer engine adapter.
//!
//! Wraps a `TransferEnginePort` with the request-building and outcome
//! classification the coordinator needs.

use std::sync::Arc;

use tokio::sync::broadcast;

use bgdl_core::{
    COOKIE_HEADER, DownloadRecord, DownloadResult, StatusMask, TransferEnginePort, TransferId,
    TransferRequest, TransferSnapshot, TransferStatus,
};

/// Normalized result of a finished transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// All bytes are at the temp path.
    Succeeded,
    /// The engine gave up; `reason` is its reason code.
    Failed { reason: i32 },
}

/// Adapter between the coordinator and the external engine.
#[derive(Clone)]
pub struct TransferEngineAdapter {
    engine: Arc<dyn TransferEnginePort>,
    request_title: String,
}

impl TransferEngineAdapter {
    pub fn new(engine: Arc<dyn TransferEnginePort>, request_title: impl Into<String>) -> Self {
        Self {
            engine,
            request_title: request_title.into(),
        }
    }

    /// Build the engine request for a record.
    ///
    /// The request targets the temp path, is hidden from the downloads UI and
    /// carries one `Cookie` header per cookie value. Cookies the request
    /// rejects are logged and skipped.
    pub fn create_request(&self, record: &DownloadRecord) -> TransferRequest {
        let mut request = TransferRequest::new(record.source_uri(), record.temp_path())
            .with_title(self.request_title.clone())
            .with_visible_in_downloads_ui(false);

        for (index, cookie) in record.cookies().iter().enumerate() {
            if let Err(e) = request.add_header(COOKIE_HEADER, cookie.as_str()) {
                tracing::warn!(
                    target: "bgdl.download",
                    uri = %record.source_uri(),
                    index,
                    error = %e,
                    "Skipping malformed cookie"
                );
            }
        }

        request
    }

    /// Build and submit the request for a record.
    pub async fn enqueue(&self, record: &DownloadRecord) -> DownloadResult<TransferId> {
        let request = self.create_request(record);
        let id = self.engine.enqueue(request).await?;
        tracing::debug!(
            target: "bgdl.download",
            transfer_id = %id,
            uri = %record.source_uri(),
            "Engine accepted transfer"
        );
        Ok(id)
    }

    /// Remove a transfer from the engine queue.
    pub async fn cancel(&self, id: TransferId) {
        tracing::debug!(target: "bgdl.download", transfer_id = %id, "Cancelling engine transfer");
        self.engine.cancel(id).await;
    }

    pub async fn query_status(&self, id: TransferId) -> Option<TransferSnapshot> {
        self.engine.query_status(id).await
    }

    /// Ids of engine transfers from `uri` whose status is in `mask`.
    ///
    /// Covers rows the registry does not know about (stale or duplicate).
    pub async fn sources_matching(&self, uri: &str, mask: StatusMask) -> Vec<TransferId> {
        self.engine
            .query_by_status(mask)
            .await
            .into_iter()
            .filter(|row| row.source_uri == uri)
            .map(|row| row.id)
            .collect()
    }

    pub fn subscribe_completions(&self) -> broadcast::Receiver<TransferId> {
        self.engine.subscribe_completions()
    }

    /// Map an engine snapshot to a normalized outcome.
    ///
    /// Anything other than `Successful` is a failure carrying the row's
    /// reason code.
    pub const fn classify(snapshot: &TransferSnapshot) -> TransferOutcome {
        match snapshot.status {
            TransferStatus::Successful => TransferOutcome::Succeeded,
            _ => TransferOutcome::Failed {
                reason: snapshot.reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use bgdl_core::{DownloadError, NoopCallback, TransferRow};

    use super::*;

    struct NullEngine {
        tx: broadcast::Sender<TransferId>,
    }

    #[async_trait]
    impl TransferEnginePort for NullEngine {
        async fn enqueue(&self, _request: TransferRequest) -> Result<TransferId, DownloadError> {
            Err(DownloadError::other("unused"))
        }

        async fn cancel(&self, _id: TransferId) {}

        async fn query_status(&self, _id: TransferId) -> Option<TransferSnapshot> {
            None
        }

        async fn query_by_status(&self, _mask: StatusMask) -> Vec<TransferRow> {
            Vec::new()
        }

        fn subscribe_completions(&self) -> broadcast::Receiver<TransferId> {
            self.tx.subscribe()
        }
    }

    fn adapter() -> TransferEngineAdapter {
        let (tx, _) = broadcast::channel(4);
        TransferEngineAdapter::new(Arc::new(NullEngine { tx }), "title")
    }

    #[test]
    fn request_carries_each_cookie_separately() {
        let record = DownloadRecord::new(
            "https://x/file.bin",
            "/data/file.bin",
            vec!["a=1".into(), "b=2".into()],
            Arc::new(NoopCallback),
        );

        let request = adapter().create_request(&record);

        assert_eq!(request.destination, record.temp_path());
        assert_eq!(request.title, "title");
        assert!(!request.visible_in_downloads_ui);
        assert_eq!(
            request.header_values(COOKIE_HEADER).collect::<Vec<_>>(),
            vec!["a=1", "b=2"]
        );
    }

    #[test]
    fn malformed_cookie_is_skipped() {
        let record = DownloadRecord::new(
            "https://x/file.bin",
            "/data/file.bin",
            vec!["a=1".into(), "bad\nvalue".into(), "c=3".into()],
            Arc::new(NoopCallback),
        );

        let request = adapter().create_request(&record);

        assert_eq!(
            request.header_values(COOKIE_HEADER).collect::<Vec<_>>(),
            vec!["a=1", "c=3"]
        );
    }

    #[test]
    fn classify_maps_non_success_to_failure() {
        let mut snapshot = TransferSnapshot {
            id: TransferId::new(1),
            status: TransferStatus::Successful,
            reason: 0,
            source_uri: "https://x".into(),
        };
        assert_eq!(
            TransferEngineAdapter::classify(&snapshot),
            TransferOutcome::Succeeded
        );

        snapshot.status = TransferStatus::Failed;
        snapshot.reason = 1008;
        assert_eq!(
            TransferEngineAdapter::classify(&snapshot),
            TransferOutcome::Failed { reason: 1008 }
        );

        snapshot.status = TransferStatus::Running;
        snapshot.reason = 0;
        assert_eq!(
            TransferEngineAdapter::classify(&snapshot),
            TransferOutcome::Failed { reason: 0 }
        );
    }
}
