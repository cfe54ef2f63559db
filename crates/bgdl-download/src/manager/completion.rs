//! Completion handling.

use async_trait::async_trait;

use bgdl_core::{
    DownloadOutcome, DownloadRecord, HTTP_FORBIDDEN, TransferId, TransferSnapshot, reason_label,
};

use super::LifecycleCoordinator;
use super::promote::promote;
use crate::engine::{TransferEngineAdapter, TransferOutcome};
use crate::listener::CompletionHandler;

/// Reported when the finished temp file cannot be renamed.
pub const PROMOTION_FAILED_MESSAGE: &str = "cannot move temp file";
/// Reported when the engine no longer knows a finished transfer.
pub const VANISHED_MESSAGE: &str = "cancelled or terminated";
/// Reported to callbacks of downloads removed by `stop`.
pub const CANCELLED_MESSAGE: &str = "cancelled";

impl LifecycleCoordinator {
    /// Handle a finished transfer.
    ///
    /// Ids not in the registry (stopped, paused, foreign) are ignored.
    /// Otherwise the record leaves the registry, its callback receives
    /// exactly one result, and the engine entry is cancelled. Returns whether
    /// the id was tracked.
    pub async fn on_completion(&self, id: TransferId) -> bool {
        let record = {
            let mut state = self.state.lock().await;
            let Some(record) = state.registry.remove(id) else {
                tracing::debug!(
                    target: "bgdl.download",
                    transfer_id = %id,
                    "Ignoring completion of untracked transfer"
                );
                return false;
            };
            state.finishing += 1;
            record
        };

        let snapshot = self.engine.query_status(id).await;
        let outcome = self.resolve(&record, snapshot.as_ref()).await;
        self.engine.cancel(id).await;

        match &outcome {
            DownloadOutcome::Success => record.callback().success(),
            DownloadOutcome::Error(message) => record.callback().error(message),
        }

        let mut state = self.state.lock().await;
        state.finishing = state.finishing.saturating_sub(1);
        self.settle(&mut state);
        true
    }

    /// Re-check every tracked transfer and complete the finished ones.
    pub async fn reconcile(&self) {
        let ids = self.state.lock().await.registry.active_ids();
        let mut completed = 0;

        for id in ids {
            let finished = self
                .engine
                .query_status(id)
                .await
                .is_none_or(|snapshot| snapshot.status.is_terminal());
            if finished && self.on_completion(id).await {
                completed += 1;
            }
        }

        tracing::info!(target: "bgdl.download", completed, "Reconciled tracked transfers");
    }

    async fn resolve(
        &self,
        record: &DownloadRecord,
        snapshot: Option<&TransferSnapshot>,
    ) -> DownloadOutcome {
        let Some(snapshot) = snapshot else {
            tracing::warn!(
                target: "bgdl.download",
                uri = %record.source_uri(),
                "Engine has no row for finished transfer"
            );
            return DownloadOutcome::Error(VANISHED_MESSAGE.to_string());
        };

        match TransferEngineAdapter::classify(snapshot) {
            TransferOutcome::Succeeded => {
                match promote(record.temp_path(), record.final_path()).await {
                    Ok(()) => {
                        tracing::info!(
                            target: "bgdl.download",
                            transfer_id = %snapshot.id,
                            path = %record.final_path().display(),
                            "Download complete"
                        );
                        DownloadOutcome::Success
                    }
                    Err(e) => {
                        tracing::warn!(
                            target: "bgdl.download",
                            transfer_id = %snapshot.id,
                            temp = %record.temp_path().display(),
                            error = %e,
                            "Could not move temp file to final path"
                        );
                        DownloadOutcome::Error(PROMOTION_FAILED_MESSAGE.to_string())
                    }
                }
            }
            TransferOutcome::Failed { reason } => {
                if reason == HTTP_FORBIDDEN {
                    // Credential refresh hook; reported like any other failure for now.
                    tracing::info!(
                        target: "bgdl.download",
                        transfer_id = %snapshot.id,
                        uri = %record.source_uri(),
                        "Server refused credentials"
                    );
                }
                let label = reason_label(reason);
                tracing::warn!(
                    target: "bgdl.download",
                    transfer_id = %snapshot.id,
                    uri = %record.source_uri(),
                    reason,
                    label = %label,
                    "Download failed"
                );
                DownloadOutcome::Error(label)
            }
        }
    }
}

#[async_trait]
impl CompletionHandler for LifecycleCoordinator {
    async fn handle_completion(&self, id: TransferId) {
        self.on_completion(id).await;
    }

    async fn resync(&self) {
        self.reconcile().await;
    }
}
