//! Engine configuration.

use std::time::Duration;

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use pixflow_runtime::engine::EngineConfig;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Engine configuration.
///
/// # Environment Variables
///
/// - `PIXFLOW_MAX_CONCURRENT_RUNS` - Concurrent prompt executions (default: 10)
/// - `PIXFLOW_MAX_PARALLEL_NODES` - Nodes run at once within a wave (default: 16)
/// - `PIXFLOW_MAX_EXPANSIONS` - Generations a single loop may create (default: 100000)
/// - `PIXFLOW_TIMEOUT_SECS` - Whole-run timeout in seconds (default: 3600)
/// - `PIXFLOW_DESCEND_LOOP_BOUNDARIES` - Clone inner loops into outer bodies (default: false)
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct EngineArgs {
    /// Maximum number of prompt executions running at the same time.
    #[arg(long, env = "PIXFLOW_MAX_CONCURRENT_RUNS", default_value_t = 10)]
    pub max_concurrent_runs: usize,

    /// Maximum number of nodes executed concurrently within one wave.
    #[arg(long, env = "PIXFLOW_MAX_PARALLEL_NODES", default_value_t = 16)]
    pub max_parallel_nodes: usize,

    /// Maximum number of generations a single loop may create.
    ///
    /// Runaway loops fail with an expansion limit error once exceeded.
    #[arg(long, env = "PIXFLOW_MAX_EXPANSIONS", default_value_t = 100_000)]
    pub max_expansions: usize,

    /// Timeout in seconds for a whole execution, loops included.
    #[arg(long, env = "PIXFLOW_TIMEOUT_SECS", default_value_t = 3600)]
    pub timeout_secs: u64,

    /// Whether loop bodies may contain complete inner loops.
    ///
    /// When set, an inner loop is cloned into every outer iteration and runs
    /// again each time. When unset, exploration stops at inner loop ends.
    #[arg(long, env = "PIXFLOW_DESCEND_LOOP_BOUNDARIES", default_value_t = false)]
    #[serde(default)]
    pub descend_loop_boundaries: bool,
}

impl EngineArgs {
    /// Validates all configuration values.
    pub fn validate(&self) -> AnyhowResult<()> {
        if self.max_concurrent_runs == 0 {
            return Err(anyhow!("max concurrent runs must be at least 1"));
        }
        if self.max_parallel_nodes == 0 {
            return Err(anyhow!("max parallel nodes must be at least 1"));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("timeout must be at least 1 second"));
        }
        Ok(())
    }

    /// Builds the runtime engine configuration.
    pub fn to_engine_config(&self) -> AnyhowResult<EngineConfig> {
        EngineConfig::builder()
            .max_concurrent_runs(self.max_concurrent_runs)
            .max_parallel_nodes(self.max_parallel_nodes)
            .max_expansions(self.max_expansions)
            .default_timeout(Duration::from_secs(self.timeout_secs))
            .descend_loop_boundaries(self.descend_loop_boundaries)
            .build()
            .map_err(|err| anyhow!("failed to build engine configuration: {err}"))
    }

    /// Logs configuration at debug level.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            max_concurrent_runs = self.max_concurrent_runs,
            max_parallel_nodes = self.max_parallel_nodes,
            max_expansions = self.max_expansions,
            timeout_secs = self.timeout_secs,
            descend_loop_boundaries = self.descend_loop_boundaries,
            "Engine configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_args() -> EngineArgs {
        EngineArgs {
            max_concurrent_runs: 10,
            max_parallel_nodes: 16,
            max_expansions: 100_000,
            timeout_secs: 3600,
            descend_loop_boundaries: false,
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let args = default_args();
        assert!(args.validate().is_ok());

        let config = args.to_engine_config().expect("build failed");
        assert_eq!(config.max_expansions, 100_000);
        assert_eq!(config.default_timeout, Duration::from_secs(3600));
    }

    #[test]
    fn test_zero_parallelism_is_rejected() {
        let args = EngineArgs {
            max_parallel_nodes: 0,
            ..default_args()
        };
        assert!(args.validate().is_err());
        assert!(args.to_engine_config().is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let args = EngineArgs {
            timeout_secs: 0,
            ..default_args()
        };
        assert!(args.validate().is_err());
    }
}
