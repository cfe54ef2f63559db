//! CLI entry point - the composition root.
//!
//! Parses arguments, installs logging on stderr (stdout belongs to the
//! bridge protocol), composes the coordinator and dispatches the command.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bgdl_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    // Load environment variables before clap reads its env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = CliConfig::from_cli(&cli)?;
    let ctx = bootstrap(config).map_err(|e| CliError::Config(format!("{e:#}")))?;

    match cli.command {
        Commands::Get { url, path, cookie } => {
            handlers::get::execute(&ctx, &url, &path, cookie).await
        }
        Commands::Bridge => handlers::bridge::execute(&ctx).await,
    }
}
