//! Completion sink port.
//!
//! Every `start` carries one callback. The coordinator invokes it at most
//! once, with either `success` or `error`, from an executor task.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Port for delivering the final outcome of a download to its caller.
///
/// Implementations must not block: they run on the executor.
pub trait DownloadCallback: Send + Sync {
    /// The file is at its final path.
    fn success(&self);

    /// The download ended without producing the file.
    ///
    /// `message` is a reason label (`ERROR_*`, an HTTP status) or one of the
    /// fixed coordinator messages.
    fn error(&self, message: &str);
}

/// The outcome a callback received, as a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "message", rename_all = "snake_case")]
pub enum DownloadOutcome {
    Success,
    Error(String),
}

impl DownloadOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// The error message, if this is an error.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Error(message) => Some(message),
        }
    }
}

/// A callback that forwards its outcome into a `oneshot` channel.
///
/// Useful for callers that want to `await` a download.
#[derive(Debug)]
pub struct ChannelCallback {
    tx: Mutex<Option<oneshot::Sender<DownloadOutcome>>>,
}

impl ChannelCallback {
    /// Create a callback and the receiver that resolves with its outcome.
    #[must_use]
    pub fn new() -> (Self, oneshot::Receiver<DownloadOutcome>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                tx: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    fn deliver(&self, outcome: DownloadOutcome) {
        let sender = self.tx.lock().ok().and_then(|mut guard| guard.take());
        let Some(sender) = sender else {
            tracing::warn!(
                target: "bgdl.download",
                outcome = ?outcome,
                "Callback invoked more than once; dropping outcome"
            );
            return;
        };
        if sender.send(outcome).is_err() {
            tracing::debug!(target: "bgdl.download", "Outcome receiver dropped");
        }
    }
}

impl DownloadCallback for ChannelCallback {
    fn success(&self) {
        self.deliver(DownloadOutcome::Success);
    }

    fn error(&self, message: &str) {
        self.deliver(DownloadOutcome::Error(message.to_string()));
    }
}

/// A callback that discards outcomes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCallback;

impl DownloadCallback for NoopCallback {
    fn success(&self) {}

    fn error(&self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_callback_delivers_success() {
        let (callback, rx) = ChannelCallback::new();
        callback.success();
        assert_eq!(tokio_test::block_on(rx).unwrap(), DownloadOutcome::Success);
    }

    #[tokio::test]
    async fn channel_callback_keeps_first_outcome() {
        let (callback, rx) = ChannelCallback::new();
        callback.error("ERROR_UNKNOWN");
        callback.success();

        let outcome = rx.await.unwrap();
        assert_eq!(outcome.error_message(), Some("ERROR_UNKNOWN"));
        assert!(!outcome.is_success());
    }

    #[test]
    fn channel_callback_tolerates_dropped_receiver() {
        let (callback, rx) = ChannelCallback::new();
        drop(rx);
        callback.success();
    }
}
