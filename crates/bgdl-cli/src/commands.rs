//! Subcommands.

use std::path::PathBuf;

use clap::Subcommand;

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download one file and wait for it to finish
    Get {
        /// Source URL (http or https)
        url: String,
        /// Final destination path
        path: PathBuf,
        /// Cookie header value; repeat for several cookies
        #[arg(long)]
        cookie: Vec<String>,
    },

    /// Serve JSON-lines requests on stdin, replies on stdout
    Bridge,
}
