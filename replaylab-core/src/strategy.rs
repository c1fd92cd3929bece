//! Strategy seam: the engine depends on this trait, never on a concrete
//! model. Implementations live with the runner and are wired up by name.

use chrono::{DateTime, Utc};

use crate::domain::{Bar, Signal};
use crate::features::{FeatureMatrix, FeatureRow};

#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    #[error("required feature `{0}` is absent from the feature matrix")]
    MissingFeature(String),

    #[error("strategy failure: {0}")]
    Other(String),
}

/// Everything a strategy may read on one bar. Strategies must be a function
/// of this context only; hidden inputs break run determinism.
#[derive(Debug, Clone, Copy)]
pub struct StrategyContext<'a> {
    pub ts: DateTime<Utc>,
    pub bar: &'a Bar,
    pub features: FeatureRow<'a>,
    /// Signed position size after this bar's execution-at-open.
    pub position: f64,
    /// Mark-to-market equity at this bar's close.
    pub equity: f64,
    pub bar_index: usize,
}

/// A model that turns per-bar context into a directional belief.
///
/// `on_bar` is invoked once per bar, after risk state for the bar has
/// resolved. Internal state is allowed as long as it is rebuilt
/// deterministically from the bars seen so far.
pub trait Strategy {
    fn name(&self) -> &str;

    /// Feature columns this strategy reads. Checked against the matrix
    /// before the run starts so a typo fails fast instead of at bar N.
    fn required_features(&self) -> Vec<String>;

    /// Bars to expect NaN features for; informational, the strategy must
    /// still handle NaN by emitting a flat signal.
    fn warmup_bars(&self) -> usize {
        0
    }

    fn on_bar(&mut self, ctx: &StrategyContext<'_>) -> Result<Signal, StrategyError>;
}

/// Verify every feature the strategy needs exists in the matrix.
pub fn validate_features(
    strategy: &dyn Strategy,
    features: &FeatureMatrix,
) -> Result<(), StrategyError> {
    for name in strategy.required_features() {
        if !features.contains(&name) {
            return Err(StrategyError::MissingFeature(name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Needy;

    impl Strategy for Needy {
        fn name(&self) -> &str {
            "needy"
        }

        fn required_features(&self) -> Vec<String> {
            vec!["sma_10_close".to_string()]
        }

        fn on_bar(&mut self, _ctx: &StrategyContext<'_>) -> Result<Signal, StrategyError> {
            Ok(Signal::flat("noop"))
        }
    }

    #[test]
    fn validate_features_flags_missing_column() {
        let m = FeatureMatrix::empty(3);
        let err = validate_features(&Needy, &m).unwrap_err();
        assert!(matches!(err, StrategyError::MissingFeature(_)));
    }

    #[test]
    fn validate_features_accepts_present_column() {
        let m = FeatureMatrix::from_columns(
            1,
            vec![("sma_10_close".to_string(), vec![f64::NAN])],
        )
        .unwrap();
        assert!(validate_features(&Needy, &m).is_ok());
    }
}
