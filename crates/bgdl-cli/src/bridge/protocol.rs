//! JSON-lines wire types.
//!
//! Requests: `{"id": 1, "action": "startAsync", "args": [...]}`.
//! Replies: `{"id": 1, "event": "success", "data": ...}` or
//! `{"id": 1, "event": "error", "message": "..."}`.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use bgdl_core::DownloadCallback;

/// One request line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BridgeRequest {
    #[serde(default)]
    pub id: Option<u64>,
    pub action: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

/// Reply payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReplyEvent {
    Success {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
    Error {
        message: String,
    },
}

/// One reply line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeReply {
    /// Id of the request; `null` when the request could not be parsed.
    pub id: Option<u64>,
    #[serde(flatten)]
    pub event: ReplyEvent,
}

impl BridgeReply {
    pub const fn success(id: Option<u64>, data: Option<Value>) -> Self {
        Self {
            id,
            event: ReplyEvent::Success { data },
        }
    }

    pub fn error(id: Option<u64>, message: impl Into<String>) -> Self {
        Self {
            id,
            event: ReplyEvent::Error {
                message: message.into(),
            },
        }
    }
}

/// Reply handle for one request.
///
/// Sends at most one reply; later calls are logged and dropped. Doubles as
/// the download callback for `start` requests.
#[derive(Debug)]
pub struct JsonLineCallback {
    id: Option<u64>,
    tx: mpsc::UnboundedSender<BridgeReply>,
    replied: AtomicBool,
}

impl JsonLineCallback {
    pub const fn new(id: Option<u64>, tx: mpsc::UnboundedSender<BridgeReply>) -> Self {
        Self {
            id,
            tx,
            replied: AtomicBool::new(false),
        }
    }

    pub const fn id(&self) -> Option<u64> {
        self.id
    }

    /// Reply with success and optional data.
    pub fn succeed(&self, data: Option<Value>) {
        self.send(BridgeReply::success(self.id, data));
    }

    /// Reply with an error message.
    pub fn fail(&self, message: &str) {
        self.send(BridgeReply::error(self.id, message));
    }

    fn send(&self, reply: BridgeReply) {
        if self.replied.swap(true, Ordering::AcqRel) {
            tracing::warn!(target: "bgdl.cli", id = ?self.id, "Dropping second reply for request");
            return;
        }
        if self.tx.send(reply).is_err() {
            tracing::warn!(target: "bgdl.cli", id = ?self.id, "Reply writer closed");
        }
    }
}

impl DownloadCallback for JsonLineCallback {
    fn success(&self) {
        self.succeed(None);
    }

    fn error(&self, message: &str) {
        self.fail(message);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn replies_serialize_flat() {
        let ok = BridgeReply::success(Some(3), Some(json!({"active": []})));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"id": 3, "event": "success", "data": {"active": []}})
        );

        let bare = BridgeReply::success(Some(4), None);
        assert_eq!(
            serde_json::to_value(&bare).unwrap(),
            json!({"id": 4, "event": "success"})
        );

        let err = BridgeReply::error(None, "malformed request: x");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"id": null, "event": "error", "message": "malformed request: x"})
        );
    }

    #[test]
    fn request_args_default_to_empty() {
        let request: BridgeRequest =
            serde_json::from_str(r#"{"id": 1, "action": "pauseAll"}"#).unwrap();
        assert_eq!(request.id, Some(1));
        assert!(request.args.is_empty());
    }

    #[test]
    fn callback_replies_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let callback = JsonLineCallback::new(Some(9), tx);

        DownloadCallback::error(&callback, "ERROR_UNKNOWN");
        DownloadCallback::success(&callback);

        assert_eq!(
            rx.try_recv().unwrap(),
            BridgeReply::error(Some(9), "ERROR_UNKNOWN")
        );
        assert!(rx.try_recv().is_err());
    }
}
