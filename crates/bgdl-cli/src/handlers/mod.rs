//! Command handlers.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<(), CliError>`
//! - Thin wrappers over the coordinator; no lifecycle logic of their own

pub mod bridge;
pub mod get;
