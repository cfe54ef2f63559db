//! Completion listener.
//!
//! Bridges the engine's "transfer finished" broadcast to the coordinator.
//! The receive loop never handles a signal itself: every id is dispatched on
//! a fresh task so a slow promotion cannot stall signal delivery.

use std::sync::Weak;

use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::{CancellationToken, DropGuard};

use bgdl_core::TransferId;

/// Receiver of demultiplexed completion signals.
#[async_trait]
pub trait CompletionHandler: Send + Sync + 'static {
    /// A transfer finished in the engine.
    async fn handle_completion(&self, id: TransferId);

    /// Signals were lost (receiver lagged); re-check every tracked transfer.
    async fn resync(&self) {}
}

/// Live subscription. Dropping it stops the receive loop.
#[derive(Debug)]
pub struct ListenerHandle {
    _guard: DropGuard,
}

/// Subscribe `handler` to `signals`, running the receive loop on `runtime`.
///
/// The listener holds the handler weakly; it stops on its own once the
/// handler is gone or the engine closes the channel.
pub fn spawn_listener(
    handler: Weak<dyn CompletionHandler>,
    mut signals: broadcast::Receiver<TransferId>,
    runtime: &Handle,
) -> ListenerHandle {
    let token = CancellationToken::new();
    let stop = token.clone();
    let dispatch = runtime.clone();

    runtime.spawn(async move {
        tracing::debug!(target: "bgdl.download", "Completion listener subscribed");
        loop {
            tokio::select! {
                biased;

                () = stop.cancelled() => break,

                received = signals.recv() => {
                    let Some(handler) = handler.upgrade() else { break };
                    match received {
                        Ok(id) => {
                            tracing::debug!(
                                target: "bgdl.download",
                                transfer_id = %id,
                                "Completion signal received"
                            );
                            dispatch.spawn(async move {
                                handler.handle_completion(id).await;
                            });
                        }
                        Err(RecvError::Lagged(missed)) => {
                            tracing::warn!(
                                target: "bgdl.download",
                                missed,
                                "Completion listener lagged; resyncing"
                            );
                            dispatch.spawn(async move {
                                handler.resync().await;
                            });
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }
        }
        tracing::debug!(target: "bgdl.download", "Completion listener released");
    });

    ListenerHandle {
        _guard: token.drop_guard(),
    }
}
