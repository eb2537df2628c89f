//! Engine configuration.

use std::time::Duration;

use derive_builder::Builder;

use crate::expand::ExploreOptions;

/// Configuration for the prompt execution engine.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct EngineConfig {
    /// Maximum number of concurrent prompt executions.
    #[builder(default = "10")]
    pub max_concurrent_runs: usize,

    /// Timeout for a whole prompt execution, loops included.
    #[builder(default = "Duration::from_secs(3600)")]
    pub default_timeout: Duration,

    /// Maximum number of nodes executed concurrently within one wave.
    #[builder(default = "16")]
    pub max_parallel_nodes: usize,

    /// Maximum number of generations a single loop may create.
    ///
    /// Counted per loop end, clones included, so independent loops do not
    /// share the budget.
    #[builder(default = "100_000")]
    pub max_expansions: usize,

    /// Whether loop bodies may contain complete inner loops.
    #[builder(default = "false")]
    pub descend_loop_boundaries: bool,
}

impl EngineConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.max_concurrent_runs == Some(0) {
            return Err("max_concurrent_runs must be at least 1".into());
        }
        if self.max_parallel_nodes == Some(0) {
            return Err("max_parallel_nodes must be at least 1".into());
        }
        if self.default_timeout == Some(Duration::ZERO) {
            return Err("default_timeout must not be zero".into());
        }
        Ok(())
    }
}

impl EngineConfig {
    /// Returns a builder for the engine configuration.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Returns the options loop ends explore their bodies with.
    pub fn explore_options(&self) -> ExploreOptions {
        ExploreOptions {
            descend_loop_boundaries: self.descend_loop_boundaries,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_runs: 10,
            default_timeout: Duration::from_secs(3600),
            max_parallel_nodes: 16,
            max_expansions: 100_000,
            descend_loop_boundaries: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_match_default() {
        let built = EngineConfig::builder().build().expect("build failed");
        let default = EngineConfig::default();
        assert_eq!(built.max_concurrent_runs, default.max_concurrent_runs);
        assert_eq!(built.max_parallel_nodes, default.max_parallel_nodes);
        assert_eq!(built.max_expansions, default.max_expansions);
        assert_eq!(built.default_timeout, default.default_timeout);
        assert!(!built.descend_loop_boundaries);
    }

    #[test]
    fn test_default_expansion_limit_covers_long_loops() {
        assert_eq!(EngineConfig::default().max_expansions, 100_000);
    }

    #[test]
    fn test_builder_rejects_zero_parallelism() {
        let result = EngineConfig::builder().max_parallel_nodes(0_usize).build();
        assert!(result.is_err());
    }
}
