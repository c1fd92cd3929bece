//! Indicator computation and the feature pipeline.
//!
//! Indicators are vectorized over the full validated bar slice before the
//! replay starts; warmup positions are NaN. No indicator value at bar t may
//! depend on bars after t.

pub mod adx;
pub mod ema;
pub mod sma;

use replaylab_core::{Bar, FeatureError, FeatureMatrix, FeatureProvider};

pub use adx::Adx;
pub use ema::Ema;
pub use sma::Sma;

/// One vectorized indicator. `name` doubles as the feature column name the
/// strategies look up, e.g. `sma_10_close` or `adx_14`.
pub trait Indicator: Send + Sync {
    fn name(&self) -> &str;

    /// Bars consumed before the first non-NaN value.
    fn lookback(&self) -> usize;

    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Computes every configured indicator over the bar series and assembles
/// the engine's feature matrix.
pub struct FeaturePipeline {
    indicators: Vec<Box<dyn Indicator>>,
}

impl FeaturePipeline {
    pub fn new(indicators: Vec<Box<dyn Indicator>>) -> Self {
        Self { indicators }
    }

    /// The longest warmup over all indicators.
    pub fn max_lookback(&self) -> usize {
        self.indicators
            .iter()
            .map(|i| i.lookback())
            .max()
            .unwrap_or(0)
    }
}

impl FeatureProvider for FeaturePipeline {
    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.indicators.iter().map(|i| i.name().to_string()).collect();
        names.sort();
        names
    }

    fn compute(&self, bars: &[Bar]) -> Result<FeatureMatrix, FeatureError> {
        let columns = self
            .indicators
            .iter()
            .map(|ind| (ind.name().to_string(), ind.compute(bars)))
            .collect();
        FeatureMatrix::from_columns(bars.len(), columns)
    }
}
