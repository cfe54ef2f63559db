//! Get command handler.
//!
//! Runs one download to completion and prints the final path.

use std::path::Path;
use std::sync::Arc;

use bgdl_core::{ChannelCallback, DownloadOutcome};
use bgdl_download::VANISHED_MESSAGE;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Execute the get command.
///
/// Ctrl-C cancels the transfer and leaves no file at `path`.
pub async fn execute(
    ctx: &CliContext,
    url: &str,
    path: &Path,
    cookies: Vec<String>,
) -> Result<(), CliError> {
    let coordinator = ctx.coordinator();
    coordinator.set_cookies(cookies);

    let (callback, outcome) = ChannelCallback::new();
    let record = coordinator.new_record(url, path, Arc::new(callback));
    let id = coordinator.submit(record).await?;
    tracing::info!(target: "bgdl.cli", transfer_id = %id, url, "Waiting for download");

    let outcome = tokio::select! {
        outcome = outcome => outcome.unwrap_or_else(|_| DownloadOutcome::Error(VANISHED_MESSAGE.to_string())),
        _ = tokio::signal::ctrl_c() => {
            coordinator.stop(url).await;
            return Err(CliError::Download("cancelled".to_string()));
        }
    };

    match outcome {
        DownloadOutcome::Success => {
            println!("{}", path.display());
            Ok(())
        }
        DownloadOutcome::Error(message) => Err(CliError::Download(message)),
    }
}
