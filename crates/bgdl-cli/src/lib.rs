//! # bgdl-cli
//!
//! Command-line front end and JSON-lines host bridge for the background
//! download coordinator.
//!
//! - `bootstrap` - composition root (HTTP engine + coordinator)
//! - `bridge` - action dispatch and the stdin/stdout protocol
//! - `handlers` - `get` and `bridge` subcommands

// Silence unused dev-dependency warnings
#[cfg(test)]
use tempfile as _;

pub mod bootstrap;
pub mod bridge;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use bridge::CommandAdapter;
pub use commands::Commands;
pub use error::{BridgeError, CliError};
pub use parser::Cli;
