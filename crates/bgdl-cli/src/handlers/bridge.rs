//! Bridge command handler.

use tokio::io::BufReader;

use crate::bootstrap::CliContext;
use crate::bridge::{CommandAdapter, run};
use crate::error::CliError;

/// Serve JSON-lines requests from stdin until it closes.
pub async fn execute(ctx: &CliContext) -> Result<(), CliError> {
    let adapter = CommandAdapter::new(ctx.coordinator().clone());
    let stdin = BufReader::new(tokio::io::stdin());
    run(&adapter, stdin, tokio::io::stdout()).await?;
    Ok(())
}
