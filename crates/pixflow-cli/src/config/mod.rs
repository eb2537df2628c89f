//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── engine: EngineArgs   # Parallelism, expansion limit, timeout
//! └── command: Command     # validate | run
//! ```
//!
//! Engine options can be provided via CLI arguments or environment variables.
//!
//! # Example
//!
//! ```bash
//! pixflow --max-expansions 500 run prompt.json
//!
//! PIXFLOW_MAX_EXPANSIONS=500 pixflow run prompt.json
//! ```

mod engine;

use std::process;

use anyhow::Context;
use clap::Parser;
pub use engine::EngineArgs;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::command::Command;
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "pixflow")]
#[command(about = "Validate and run node graph prompts with loops and branches")]
#[command(version)]
pub struct Cli {
    /// Engine configuration shared by every command.
    #[clap(flatten)]
    pub engine: EngineArgs,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is read before clap parses so its variables act as defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    ///
    /// Logs go to stderr so command output on stdout stays machine-readable.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.engine
            .validate()
            .context("invalid engine configuration")?;
        Ok(())
    }

    /// Logs configuration at debug level.
    pub fn log(&self) {
        Self::log_build_info();
        self.engine.log();

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            command = self.command.name(),
            "Command selected"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_engine_flags() {
        let cli = Cli::try_parse_from([
            "pixflow",
            "--max-expansions",
            "25",
            "--descend-loop-boundaries",
            "run",
            "prompt.json",
        ])
        .expect("parse failed");

        assert_eq!(cli.engine.max_expansions, 25);
        assert!(cli.engine.descend_loop_boundaries);
        assert_eq!(cli.command.name(), "run");
    }
}
