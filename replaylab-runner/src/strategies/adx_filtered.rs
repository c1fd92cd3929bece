//! MA crossover gated by ADX: below the trend-strength threshold the
//! strategy goes (and stays) flat, including flattening open positions.

use replaylab_core::{Signal, Strategy, StrategyContext, StrategyError};

pub struct AdxFilteredCrossover {
    fast_col: String,
    slow_col: String,
    adx_col: String,
    adx_threshold: f64,
    warmup: usize,
}

impl AdxFilteredCrossover {
    pub fn new(
        fast_col: impl Into<String>,
        slow_col: impl Into<String>,
        adx_col: impl Into<String>,
        adx_threshold: f64,
        warmup: usize,
    ) -> Self {
        Self {
            fast_col: fast_col.into(),
            slow_col: slow_col.into(),
            adx_col: adx_col.into(),
            adx_threshold,
            warmup,
        }
    }
}

impl Strategy for AdxFilteredCrossover {
    fn name(&self) -> &str {
        "adx_filtered_crossover"
    }

    fn required_features(&self) -> Vec<String> {
        vec![
            self.fast_col.clone(),
            self.slow_col.clone(),
            self.adx_col.clone(),
        ]
    }

    fn warmup_bars(&self) -> usize {
        self.warmup
    }

    fn on_bar(&mut self, ctx: &StrategyContext<'_>) -> Result<Signal, StrategyError> {
        if ctx.bar_index < self.warmup {
            return Ok(Signal::flat("warmup/feature_nan"));
        }

        let adx = ctx
            .features
            .get(&self.adx_col)
            .ok_or_else(|| StrategyError::MissingFeature(self.adx_col.clone()))?;
        let fast = ctx
            .features
            .get(&self.fast_col)
            .ok_or_else(|| StrategyError::MissingFeature(self.fast_col.clone()))?;
        let slow = ctx
            .features
            .get(&self.slow_col)
            .ok_or_else(|| StrategyError::MissingFeature(self.slow_col.clone()))?;
        if adx.is_nan() || fast.is_nan() || slow.is_nan() {
            return Ok(Signal::flat("warmup/feature_nan"));
        }

        if adx < self.adx_threshold {
            return Ok(Signal::flat("adx_below_threshold"));
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
