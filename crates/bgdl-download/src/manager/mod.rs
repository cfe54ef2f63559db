//! Lifecycle coordinator implementation.
//!
//! The coordinator owns the active registry, the paused list and the cookie
//! store, and is the only component that mutates them.
//!
//! # Architecture
//!
//! - **Coordinator**: start/stop/pause/resume, serialized behind one lock
//! - **Engine adapter**: builds requests, talks to the `TransferEnginePort`
//! - **Listener**: forwards engine completion signals to `on_completion`
//!
//! # Concurrency Model
//!
//! - One `tokio::sync::Mutex` guards the registry, paused list and listener
//! - `submit` holds the lock from the stop sweep through the registry insert,
//!   so completion handling never observes a half-started download
//! - Records leave the registry by being removed under the lock; whoever
//!   removes a record is the only one allowed to invoke its callback
//! - Callbacks run outside the lock

mod completion;
mod promote;

use std::path::PathBuf;
use std::sync::{Arc, Weak};

use tokio::runtime::Handle;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use bgdl_core::{
    DownloadCallback, DownloadRecord, DownloadResult, RegistrySnapshot, TransferEnginePort,
    TransferId,
};

use crate::config::CoordinatorConfig;
use crate::cookies::CookieStore;
use crate::engine::TransferEngineAdapter;
use crate::listener::{ListenerHandle, spawn_listener};
use crate::registry::DownloadRegistry;

pub use completion::{CANCELLED_MESSAGE, PROMOTION_FAILED_MESSAGE, VANISHED_MESSAGE};
pub use promote::{promote, remove_stale_temp};

/// Dependencies for creating a lifecycle coordinator.
pub struct CoordinatorDeps {
    /// The external transfer engine.
    pub engine: Arc<dyn TransferEnginePort>,
    /// Configuration for the coordinator.
    pub config: CoordinatorConfig,
    /// Runtime that runs scheduled operations and completion handling.
    pub runtime: Handle,
}

/// Build a coordinator from its dependencies.
pub fn build_coordinator(deps: CoordinatorDeps) -> Arc<LifecycleCoordinator> {
    let CoordinatorDeps {
        engine,
        config,
        runtime,
    } = deps;
    let (active_tx, _) = watch::channel(0);

    Arc::new_cyclic(|this| LifecycleCoordinator {
        engine: TransferEngineAdapter::new(engine, config.request_title.clone()),
        cookies: CookieStore::new(),
        config,
        runtime,
        state: Mutex::new(CoordinatorState::default()),
        active_tx,
        this: this.clone(),
    })
}

/// Coordinator operations that can be scheduled from any thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Silently discard every download of the URI.
    StopAll(String),
    /// Cancel every download of the URI, reporting `"cancelled"`.
    Stop(String),
    /// Move every active download to the paused list.
    PauseAll,
    /// Resubmit every paused download.
    ResumeAll,
    /// Cancel everything and drop the paused list.
    Shutdown,
}

/// Which active records a submit stops besides same-URI ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Displace {
    Others,
    SameUriOnly,
}

#[derive(Default)]
struct CoordinatorState {
    registry: DownloadRegistry,
    listener: Option<ListenerHandle>,
    /// Records removed for completion whose callback has not run yet.
    finishing: usize,
}

/// Owns the download lifecycle: registry, paused list, cookies, listener.
pub struct LifecycleCoordinator {
    engine: TransferEngineAdapter,
    cookies: CookieStore,
    config: CoordinatorConfig,
    runtime: Handle,
    state: Mutex<CoordinatorState>,
    /// Active plus finishing downloads, for `wait_idle`.
    active_tx: watch::Sender<usize>,
    this: Weak<Self>,
}

impl LifecycleCoordinator {
    pub const fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Replace the cookie set used by subsequently created records.
    pub fn set_cookies(&self, cookies: Vec<String>) {
        tracing::debug!(target: "bgdl.download", count = cookies.len(), "Cookie set replaced");
        self.cookies.set(cookies);
    }

    pub fn cookies(&self) -> Vec<String> {
        self.cookies.snapshot()
    }

    /// Create a record carrying the current cookie snapshot.
    pub fn new_record(
        &self,
        uri: impl Into<String>,
        final_path: impl Into<PathBuf>,
        callback: Arc<dyn DownloadCallback>,
    ) -> DownloadRecord {
        DownloadRecord::with_temp_suffix(
            uri,
            final_path,
            &self.config.temp_suffix,
            self.cookies.snapshot(),
            callback,
        )
    }

    /// Start a download and return immediately.
    ///
    /// Cookies are captured now; the submit sequence runs on the runtime.
    /// Any download already in flight is stopped without notifying its
    /// callback. The callback is the only completion signal: enqueue
    /// failures are reported through it too.
    pub fn start(
        self: &Arc<Self>,
        uri: impl Into<String>,
        final_path: impl Into<PathBuf>,
        callback: Arc<dyn DownloadCallback>,
    ) -> JoinHandle<()> {
        let record = self.new_record(uri, final_path, callback);
        let this = Arc::clone(self);

        self.runtime.spawn(async move {
            let callback = Arc::clone(record.callback());
            let uri = record.source_uri().to_string();
            if let Err(e) = this.submit(record).await {
                tracing::warn!(
                    target: "bgdl.download",
                    uri = %uri,
                    error = %e,
                    "Download could not be submitted"
                );
                callback.error(&e.to_string());
            }
        })
    }

    /// Schedule an operation on the runtime and return immediately.
    pub fn schedule(self: &Arc<Self>, operation: Operation) -> JoinHandle<()> {
        let this = Arc::clone(self);
        self.runtime.spawn(async move {
            this.run(operation).await;
        })
    }

    /// Run an operation to completion.
    pub async fn run(&self, operation: Operation) {
        match operation {
            Operation::StopAll(uri) => {
                self.stop_all(&uri).await;
            }
            Operation::Stop(uri) => {
                self.stop(&uri).await;
            }
            Operation::PauseAll => {
                self.pause_all().await;
            }
            Operation::ResumeAll => {
                self.resume_all().await;
            }
            Operation::Shutdown => self.shutdown().await,
        }
    }

    /// Submit a record to the engine.
    ///
    /// 1. Stop engine transfers and registry records for the same URI
    /// 2. Stop every other active record (one logical download at a time)
    /// 3. Remove a leftover temp file
    /// 4. Subscribe the completion listener if needed
    /// 5. Enqueue and insert under the returned id
    pub async fn submit(&self, record: DownloadRecord) -> DownloadResult<TransferId> {
        self.submit_with(record, Displace::Others).await
    }

    async fn submit_with(
        &self,
        mut record: DownloadRecord,
        displace: Displace,
    ) -> DownloadResult<TransferId> {
        let mut state = self.state.lock().await;

        let replaced = self.sweep_locked(&mut state, record.source_uri()).await;
        let displaced = match displace {
            Displace::Others => self.displace_locked(&mut state).await,
            Displace::SameUriOnly => Vec::new(),
        };
        for old in replaced.iter().chain(&displaced) {
            tracing::info!(
                target: "bgdl.download",
                uri = %old.source_uri(),
                path = %old.final_path().display(),
                replaced_by = %record.source_uri(),
                "Stopped download replaced by new start"
            );
        }

        match remove_stale_temp(record.temp_path()).await {
            Ok(true) => tracing::debug!(
                target: "bgdl.download",
                path = %record.temp_path().display(),
                "Removed leftover temp file"
            ),
            Ok(false) => {}
            Err(e) => tracing::warn!(
                target: "bgdl.download",
                path = %record.temp_path().display(),
                error = %e,
                "Could not remove leftover temp file"
            ),
        }

        if state.listener.is_none() {
            state.listener = Some(spawn_listener(
                self.this.clone(),
                self.engine.subscribe_completions(),
                &self.runtime,
            ));
        }

        match self.engine.enqueue(&record).await {
            Ok(id) => {
                record.assign(id);
                tracing::info!(
                    target: "bgdl.download",
                    transfer_id = %id,
                    uri = %record.source_uri(),
                    path = %record.final_path().display(),
                    "Download submitted"
                );
                if let Some(stale) = state.registry.insert(record)? {
                    tracing::warn!(
                        target: "bgdl.download",
                        transfer_id = %id,
                        uri = %stale.source_uri(),
                        "Engine reused a tracked transfer id; dropping old record"
                    );
                }
                self.settle(&mut state);
                Ok(id)
            }
            Err(e) => {
                self.settle(&mut state);
                Err(e)
            }
        }
    }

    /// Silently discard every download of `uri`.
    ///
    /// Callbacks of removed records are never invoked. Returns the number of
    /// registry records removed.
    pub async fn stop_all(&self, uri: &str) -> usize {
        let removed = {
            let mut state = self.state.lock().await;
            let removed = self.sweep_locked(&mut state, uri).await;
            self.settle(&mut state);
            removed
        };
        tracing::info!(target: "bgdl.download", uri, removed = removed.len(), "Stopped downloads");
        removed.len()
    }

    /// Cancel every download of `uri`, reporting `"cancelled"` to each.
    pub async fn stop(&self, uri: &str) -> usize {
        let removed = {
            let mut state = self.state.lock().await;
            let removed = self.sweep_locked(&mut state, uri).await;
            self.settle(&mut state);
            removed
        };
        for record in &removed {
            record.callback().error(CANCELLED_MESSAGE);
        }
        tracing::info!(target: "bgdl.download", uri, cancelled = removed.len(), "Cancelled downloads");
        removed.len()
    }

    /// Move every active download to the paused list and cancel it.
    ///
    /// Partially written temp files are left in place.
    pub async fn pause_all(&self) -> usize {
        let mut state = self.state.lock().await;
        let ids = state.registry.pause_active();
        for id in &ids {
            self.engine.cancel(*id).await;
        }
        self.settle(&mut state);
        tracing::info!(target: "bgdl.download", paused = ids.len(), "Paused downloads");
        ids.len()
    }

    /// Resubmit every paused download in list order.
    ///
    /// Only same-URI transfers are swept, so records of one batch never
    /// displace each other. Each record keeps the cookies it was created
    /// with. A record that cannot be resubmitted reports the error through
    /// its callback. Returns how many resumed records are still active.
    pub async fn resume_all(&self) -> usize {
        let records = self.state.lock().await.registry.take_paused();
        let total = records.len();
        let mut submitted = Vec::with_capacity(total);

        for record in records {
            let callback = Arc::clone(record.callback());
            match self.submit_with(record, Displace::SameUriOnly).await {
                Ok(id) => submitted.push(id),
                Err(e) => callback.error(&e.to_string()),
            }
        }

        let resumed = {
            let state = self.state.lock().await;
            submitted
                .iter()
                .filter(|id| state.registry.contains(**id))
                .count()
        };
        tracing::info!(target: "bgdl.download", resumed, total, "Resumed downloads");
        resumed
    }

    /// Cancel every active download, drop the paused list and release the
    /// listener. No callback is invoked.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        let drained = state.registry.drain_active();
        for record in &drained {
            if let Some(id) = record.transfer_id() {
                self.engine.cancel(id).await;
            }
        }
        let dropped = state.registry.clear_paused();
        state.listener = None;
        self.publish(&state);
        tracing::info!(
            target: "bgdl.download",
            cancelled = drained.len(),
            dropped,
            "Coordinator shut down"
        );
    }

    pub async fn snapshot(&self) -> RegistrySnapshot {
        self.state.lock().await.registry.snapshot()
    }

    /// Active downloads plus downloads whose callback is still pending.
    pub fn active_count(&self) -> usize {
        *self.active_tx.borrow()
    }

    /// Resolve once no download is active or finishing.
    pub async fn wait_idle(&self) {
        let mut rx = self.active_tx.subscribe();
        let _ = rx.wait_for(|count| *count == 0).await;
    }

    /// Remove every engine transfer and registry record for `uri`.
    async fn sweep_locked(&self, state: &mut CoordinatorState, uri: &str) -> Vec<DownloadRecord> {
        let mut removed = Vec::new();

        for id in self.engine.sources_matching(uri, self.config.sweep_mask).await {
            self.engine.cancel(id).await;
            if let Some(record) = state.registry.remove(id) {
                removed.push(record);
            }
        }

        for record in state.registry.remove_by_uri(uri) {
            if let Some(id) = record.transfer_id() {
                self.engine.cancel(id).await;
            }
            removed.push(record);
        }

        removed
    }

    /// Remove and cancel every remaining active record.
    async fn displace_locked(&self, state: &mut CoordinatorState) -> Vec<DownloadRecord> {
        let displaced = state.registry.drain_active();
        for record in &displaced {
            if let Some(id) = record.transfer_id() {
                self.engine.cancel(id).await;
            }
        }
        displaced
    }

    /// Publish the active count and release the listener when idle.
    fn settle(&self, state: &mut CoordinatorState) {
        if state.registry.is_idle()
            && state.finishing == 0
            && self.config.release_listener_when_idle
            && state.listener.take().is_some()
        {
            tracing::debug!(target: "bgdl.download", "Registry idle; releasing listener");
        }
        self.publish(state);
    }

    fn publish(&self, state: &CoordinatorState) {
        self.active_tx
            .send_replace(state.registry.active_len() + state.finishing);
    }
}
