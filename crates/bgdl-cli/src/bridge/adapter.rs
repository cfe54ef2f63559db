//! Command adapter: action-string dispatch over JSON array arguments.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;

use bgdl_download::LifecycleCoordinator;

use super::protocol::JsonLineCallback;
use crate::error::BridgeError;

/// Actions understood by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Stop,
    SetCookies,
    PauseAll,
    ResumeAll,
    Snapshot,
}

impl Action {
    /// Look up an action by its wire name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "startAsync" | "start" => Some(Self::Start),
            "stop" => Some(Self::Stop),
            "setCookies" => Some(Self::SetCookies),
            "pauseAll" => Some(Self::PauseAll),
            "resumeAll" => Some(Self::ResumeAll),
            "snapshot" => Some(Self::Snapshot),
            _ => None,
        }
    }
}

/// Dispatches bridge actions to the coordinator.
pub struct CommandAdapter {
    coordinator: Arc<LifecycleCoordinator>,
}

impl CommandAdapter {
    pub const fn new(coordinator: Arc<LifecycleCoordinator>) -> Self {
        Self { coordinator }
    }

    pub const fn coordinator(&self) -> &Arc<LifecycleCoordinator> {
        &self.coordinator
    }

    /// Execute `action`. Returns `Ok(false)` for an unknown action.
    ///
    /// `start` replies once the download finishes; every other action replies
    /// before this returns. Argument errors are returned without replying.
    ///
    /// Unlike `LifecycleCoordinator::start`, which returns immediately, `start`
    /// here awaits the submit sequence, so the caller's reader waits on the
    /// engine's enqueue before taking the next line.
    pub async fn execute(
        &self,
        action: &str,
        args: &[Value],
        reply: Arc<JsonLineCallback>,
    ) -> Result<bool, BridgeError> {
        let Some(action) = Action::parse(action) else {
            return Ok(false);
        };
        tracing::debug!(target: "bgdl.cli", ?action, id = ?reply.id(), "Executing bridge action");

        match action {
            Action::Start => {
                let uri = string_arg(args, 0, "uri")?;
                let path = PathBuf::from(string_arg(args, 1, "path")?);
                if let Some(cookies) = args.get(2).filter(|v| !v.is_null()) {
                    self.coordinator.set_cookies(cookie_list(cookies, 2)?);
                }

                let record = self.coordinator.new_record(uri, path, reply.clone());
                if let Err(e) = self.coordinator.submit(record).await {
                    reply.fail(&e.to_string());
                }
            }
            Action::Stop => {
                let uri = string_arg(args, 0, "uri")?;
                self.coordinator.stop(&uri).await;
                reply.succeed(None);
            }
            Action::SetCookies => {
                let cookies = match args {
                    [list @ Value::Array(_)] => cookie_list(list, 0)?,
                    items => items.iter().map(value_text).collect(),
                };
                self.coordinator.set_cookies(cookies);
                reply.succeed(None);
            }
            Action::PauseAll => {
                self.coordinator.pause_all().await;
                reply.succeed(None);
            }
            Action::ResumeAll => {
                self.coordinator.resume_all().await;
                reply.succeed(None);
            }
            Action::Snapshot => {
                let snapshot = self.coordinator.snapshot().await;
                reply.succeed(Some(serde_json::to_value(snapshot)?));
            }
        }

        Ok(true)
    }
}

/// Text of a JSON value: strings as-is, anything else as its JSON text.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Required positional argument as text.
pub fn string_arg(args: &[Value], index: usize, name: &'static str) -> Result<String, BridgeError> {
    match args.get(index) {
        None | Some(Value::Null) => Err(BridgeError::MissingArgument { index, name }),
        Some(value) => Ok(value_text(value)),
    }
}

/// A JSON array of cookies.
pub fn cookie_list(value: &Value, index: usize) -> Result<Vec<String>, BridgeError> {
    let Value::Array(items) = value else {
        return Err(BridgeError::InvalidArgument {
            index,
            name: "cookies",
            expected: "an array",
        });
    };
    Ok(items.iter().map(value_text).collect())
}
