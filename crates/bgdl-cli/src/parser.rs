//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the background download coordinator.
///
/// Engine options are global so both subcommands share the same
/// composition.
#[derive(Debug, Parser)]
#[command(name = "bgdl")]
#[command(about = "Background downloads with temp-file promotion")]
#[command(version)]
pub struct Cli {
    /// User-Agent sent with every transfer
    #[arg(long, env = "BGDL_USER_AGENT", global = true)]
    pub user_agent: Option<String>,

    /// Seconds allowed for establishing a connection
    #[arg(long, env = "BGDL_CONNECT_TIMEOUT_SECS", global = true, default_value_t = 30)]
    pub connect_timeout_secs: u64,

    /// Redirects followed before a transfer fails
    #[arg(long, env = "BGDL_MAX_REDIRECTS", global = true, default_value_t = 10)]
    pub max_redirects: usize,

    /// Suffix of the file written while a transfer runs
    #[arg(long, env = "BGDL_TEMP_SUFFIX", global = true, default_value = ".temp")]
    pub temp_suffix: String,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_get_with_cookies() {
        let cli = Cli::parse_from([
            "bgdl",
            "get",
            "https://example.com/a.bin",
            "/tmp/a.bin",
            "--cookie",
            "sid=1",
            "--cookie",
            "lang=en",
        ]);

        let Commands::Get { url, path, cookie } = cli.command else {
            panic!("expected get");
        };
        assert_eq!(url, "https://example.com/a.bin");
        assert_eq!(path.to_str(), Some("/tmp/a.bin"));
        assert_eq!(cookie, vec!["sid=1", "lang=en"]);
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from([
            "bgdl",
            "--max-redirects",
            "2",
            "--temp-suffix",
            ".part",
            "bridge",
        ]);
        assert_eq!(cli.max_redirects, 2);
        assert_eq!(cli.temp_suffix, ".part");
        assert!(matches!(cli.command, Commands::Bridge));
    }
}
