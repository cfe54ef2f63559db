//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - HTTP transfer engine (via bgdl-http)
//! - Lifecycle coordinator (via bgdl-download)
//!
//! Command handlers receive the composed `CliContext`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::runtime::Handle;

use bgdl_download::{CoordinatorConfig, CoordinatorDeps, LifecycleCoordinator, build_coordinator};
use bgdl_http::{HttpEngineConfig, HttpTransferEngine};

use crate::error::CliError;
use crate::parser::Cli;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Engine configuration.
    pub engine: HttpEngineConfig,
    /// Coordinator configuration.
    pub coordinator: CoordinatorConfig,
}

impl CliConfig {
    /// Build the configuration from parsed arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.connect_timeout_secs == 0 {
            return Err(CliError::Config(
                "connect timeout must be at least one second".to_string(),
            ));
        }
        if cli.temp_suffix.is_empty() {
            return Err(CliError::Config("temp suffix must not be empty".to_string()));
        }

        let mut engine = HttpEngineConfig::new()
            .with_connect_timeout(Duration::from_secs(cli.connect_timeout_secs))
            .with_max_redirects(cli.max_redirects);
        if let Some(user_agent) = &cli.user_agent {
            engine = engine.with_user_agent(user_agent.clone());
        }

        Ok(Self {
            engine,
            coordinator: CoordinatorConfig::new().with_temp_suffix(cli.temp_suffix.clone()),
        })
    }
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    /// The download lifecycle coordinator.
    pub coordinator: Arc<LifecycleCoordinator>,
}

impl CliContext {
    /// Access the coordinator.
    pub const fn coordinator(&self) -> &Arc<LifecycleCoordinator> {
        &self.coordinator
    }
}

/// Bootstrap the CLI application.
///
/// Must be called from within a tokio runtime; the coordinator captures the
/// current handle.
pub fn bootstrap(config: CliConfig) -> Result<CliContext> {
    let engine = HttpTransferEngine::new(&config.engine).context("Failed to create HTTP engine")?;

    let coordinator = build_coordinator(CoordinatorDeps {
        engine: Arc::new(engine),
        config: config.coordinator,
        runtime: Handle::current(),
    });

    tracing::debug!(
        target: "bgdl.cli",
        user_agent = %config.engine.user_agent,
        max_redirects = config.engine.max_redirects,
        "Composed coordinator"
    );

    Ok(CliContext { coordinator })
}
