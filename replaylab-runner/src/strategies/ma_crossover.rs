//! Moving-average crossover: long while the fast average is above the slow
//! one, short while below.

use replaylab_core::{Signal, Strategy, StrategyContext, StrategyError};

pub struct MaCrossover {
    fast_col: String,
    slow_col: String,
    warmup: usize,
}

impl MaCrossover {
    pub fn new(fast_col: impl Into<String>, slow_col: impl Into<String>, warmup: usize) -> Self {
        Self {
            fast_col: fast_col.into(),
            slow_col: slow_col.into(),
            warmup,
        }
    }
}

impl Strategy for MaCrossover {
    fn name(&self) -> &str {
        "ma_crossover"
    }

    fn required_features(&self) -> Vec<String> {
        vec![self.fast_col.clone(), self.slow_col.clone()]
    }

    fn warmup_bars(&self) -> usize {
        self.warmup
    }

    fn on_bar(&mut self, ctx: &StrategyContext<'_>) -> Result<Signal, StrategyError> {
        if ctx.bar_index < self.warmup {
            return Ok(Signal::flat("warmup/feature_nan"));
        }

        let fast = ctx
            .features
            .get(&self.fast_col)
            .ok_or_else(|| StrategyError::MissingFeature(self.fast_col.clone()))?;
        let slow = ctx
            .features
            .get(&self.slow_col)
            .ok_or_else(|| StrategyError::MissingFeature(self.slow_col.clone()))?;
        if fast.is_nan() || slow.is_nan() {
            return Ok(Signal::flat("warmup/feature_nan"));
        }

        if fast > slow {
            Ok(Signal::long("cross_above"))
        } else if fast < slow {
            Ok(Signal::short("cross_below"))
        } else {
            Ok(Signal::flat("equal"))
        }
    }
}
