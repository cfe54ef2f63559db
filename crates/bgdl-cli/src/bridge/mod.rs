//! JSON-lines host bridge.
//!
//! Requests are read one per line and executed in order. Replies are written
//! by a single writer task, so a `start` reply can arrive after replies to
//! later requests. At end of input the bridge waits until no download is
//! active, then shuts the coordinator down.

mod adapter;
mod protocol;

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

pub use adapter::{Action, CommandAdapter, cookie_list, string_arg, value_text};
pub use protocol::{BridgeReply, BridgeRequest, JsonLineCallback, ReplyEvent};

use crate::error::{BridgeError, CliError};

/// Error message for an action the adapter does not know.
pub const INVALID_ACTION: &str = "invalid action";

/// Run the bridge until `input` ends. Returns `output` once every reply has
/// been written.
pub async fn run<R, W>(adapter: &CommandAdapter, input: R, output: W) -> Result<W, CliError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_replies(rx, output));

    let mut lines = input.lines();
    let mut handled: u64 = 0;
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        dispatch(adapter, &line, &tx).await;
        handled += 1;
    }

    tracing::info!(target: "bgdl.cli", handled, "Input closed; waiting for downloads");
    adapter.coordinator().wait_idle().await;
    adapter.coordinator().shutdown().await;
    drop(tx);

    writer
        .await
        .map_err(|e| CliError::Io(format!("reply writer failed: {e}")))?
        .map_err(CliError::from)
}

/// Parse and execute one request line.
pub async fn dispatch(
    adapter: &CommandAdapter,
    line: &str,
    tx: &mpsc::UnboundedSender<BridgeReply>,
) {
    let request: BridgeRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(target: "bgdl.cli", error = %e, "Malformed request line");
            let _ = tx.send(BridgeReply::error(
                None,
                BridgeError::Malformed(e.to_string()).to_string(),
            ));
            return;
        }
    };

    let reply = Arc::new(JsonLineCallback::new(request.id, tx.clone()));
    match adapter
        .execute(&request.action, &request.args, Arc::clone(&reply))
        .await
    {
        Ok(true) => {}
        Ok(false) => reply.fail(&format!("{INVALID_ACTION}: {}", request.action)),
        Err(e) => reply.fail(&e.to_string()),
    }
}

async fn write_replies<W>(mut rx: mpsc::UnboundedReceiver<BridgeReply>, mut output: W) -> io::Result<W>
where
    W: AsyncWrite + Unpin,
{
    while let Some(reply) = rx.recv().await {
        let mut line = serde_json::to_vec(&reply)?;
        line.push(b'\n');
        output.write_all(&line).await?;
        output.flush().await?;
    }
    Ok(output)
}
