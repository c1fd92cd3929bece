//! Parameter sweeps: many independent runs in parallel.
//!
//! Each run owns its engine, risk, and log state exclusively, so runs
//! parallelize with no shared mutable state. Results come back in grid
//! order regardless of scheduling.

use rayon::prelude::*;

use crate::config::{RunConfig, RunId, StrategyConfig};
use crate::runner::{run_backtest, BacktestArtifacts, RunError};

/// Crossover period grid for a sweep.
#[derive(Debug, Clone)]
pub struct ParamGrid {
    pub fast_periods: Vec<usize>,
    pub slow_periods: Vec<usize>,
}

impl ParamGrid {
    /// Fast 10/20/30 against slow 50/100/200.
    pub fn crossover_default() -> Self {
        Self {
            fast_periods: vec![10, 20, 30],
            slow_periods: vec![50, 100, 200],
        }
    }

    /// All valid (fast < slow) configs derived from a base config.
    pub fn generate_configs(&self, base: &RunConfig) -> Vec<RunConfig> {
        let mut configs = Vec::new();
        for &fast in &self.fast_periods {
            for &slow in &self.slow_periods {
                if fast >= slow {
                    continue;
                }
                let mut cfg = base.clone();
                cfg.strategy = match cfg.strategy {
                    StrategyConfig::MaCrossover { indicator, .. } => StrategyConfig::MaCrossover {
                        fast_period: fast,
                        slow_period: slow,
                        indicator,
                    },
                    StrategyConfig::AdxFilteredCrossover {
                        indicator,
                        adx_period,
                        adx_threshold,
                        ..
                    } => StrategyConfig::AdxFilteredCrossover {
                        fast_period: fast,
                        slow_period: slow,
                        indicator,
                        adx_period,
                        adx_threshold,
                    },
                };
                configs.push(cfg);
            }
        }
        configs
    }
}

/// Run every config in parallel. Failures are reported per run; one bad
/// config does not sink the sweep.
pub fn run_many(configs: &[RunConfig]) -> Vec<(RunId, Result<BacktestArtifacts, RunError>)> {
    configs
        .par_iter()
        .map(|cfg| (cfg.run_id(), run_backtest(cfg)))
        .collect()
}
