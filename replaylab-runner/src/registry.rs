//! Maps strategy configuration onto a concrete strategy plus the indicators
//! it needs. The engine never sees concrete strategy types; everything flows
//! through the core traits.

use replaylab_core::Strategy;

use crate::config::{MaKind, StrategyConfig};
use crate::features::{Adx, Ema, Indicator, Sma};
use crate::strategies::{AdxFilteredCrossover, MaCrossover};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid strategy parameters: {0}")]
    BadParams(String),
}

/// A ready-to-run strategy with its indicator set.
pub struct StrategyBundle {
    pub strategy: Box<dyn Strategy>,
    pub indicators: Vec<Box<dyn Indicator>>,
}

impl std::fmt::Debug for StrategyBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyBundle")
            .field("strategy", &self.strategy.name())
            .field("indicators", &self.indicators.len())
            .finish()
    }
}

fn ma_indicator(kind: MaKind, period: usize) -> (String, Box<dyn Indicator>) {
    match kind {
        MaKind::Sma => {
            let ind = Sma::new(period);
            (ind.name().to_string(), Box::new(ind))
        }
        MaKind::Ema => {
            let ind = Ema::new(period);
            (ind.name().to_string(), Box::new(ind))
        }
    }
}

/// Instantiate the strategy named by the config.
pub fn build_strategy(cfg: &StrategyConfig) -> Result<StrategyBundle, RegistryError> {
    match *cfg {
        StrategyConfig::MaCrossover {
            fast_period,
            slow_period,
            indicator,
        } => {
            if fast_period == 0 || fast_period >= slow_period {
                return Err(RegistryError::BadParams(format!(
                    "fast_period ({fast_period}) must be nonzero and below slow_period ({slow_period})"
                )));
            }
            let (fast_col, fast_ind) = ma_indicator(indicator, fast_period);
            let (slow_col, slow_ind) = ma_indicator(indicator, slow_period);
            Ok(StrategyBundle {
                strategy: Box::new(MaCrossover::new(fast_col, slow_col, slow_period)),
                indicators: vec![fast_ind, slow_ind],
            })
        }
        StrategyConfig::AdxFilteredCrossover {
            fast_period,
            slow_period,
            indicator,
            adx_period,
            adx_threshold,
        } => {
            if fast_period == 0 || fast_period >= slow_period {
                return Err(RegistryError::BadParams(format!(
                    "fast_period ({fast_period}) must be nonzero and below slow_period ({slow_period})"
                )));
            }
            if adx_period == 0 {
                return Err(RegistryError::BadParams("adx_period must be >= 1".into()));
            }
            let (fast_col, fast_ind) = ma_indicator(indicator, fast_period);
            let (slow_col, slow_ind) = ma_indicator(indicator, slow_period);
            let adx = Adx::new(adx_period);
            let adx_col = adx.name().to_string();
            let warmup = slow_period.max(2 * adx_period);
            Ok(StrategyBundle {
                strategy: Box::new(AdxFilteredCrossover::new(
                    fast_col,
                    slow_col,
                    adx_col,
                    adx_threshold,
                    warmup,
                )),
                indicators: vec![fast_ind, slow_ind, Box::new(adx)],
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossover_bundle_names_match() {
        let bundle = build_strategy(&StrategyConfig::MaCrossover {
            fast_period: 10,
            slow_period: 30,
            indicator: MaKind::Sma,
        })
        .unwrap();
        assert_eq!(bundle.strategy.name(), "ma_crossover");
        assert_eq!(
            bundle.strategy.required_features(),
            vec!["sma_10_close", "sma_30_close"]
        );
        assert_eq!(bundle.indicators.len(), 2);
        assert_eq!(bundle.strategy.warmup_bars(), 30);
    }

    #[test]
    fn ema_variant_switches_columns() {
        let bundle = build_strategy(&StrategyConfig::MaCrossover {
            fast_period: 5,
            slow_period: 20,
            indicator: MaKind::Ema,
        })
        .unwrap();
        assert_eq!(
            bundle.strategy.required_features(),
            vec!["ema_5_close", "ema_20_close"]
        );
    }

    #[test]
    fn adx_warmup_covers_both_indicators() {
        let bundle = build_strategy(&StrategyConfig::AdxFilteredCrossover {
            fast_period: 10,
            slow_period: 20,
            indicator: MaKind::Sma,
            adx_period: 14,
            adx_threshold: 25.0,
        })
        .unwrap();
        // 2 * adx_period = 28 > slow_period = 20
        assert_eq!(bundle.strategy.warmup_bars(), 28);
        assert_eq!(bundle.indicators.len(), 3);
    }

    #[test]
    fn inverted_periods_are_rejected() {
        let err = build_strategy(&StrategyConfig::MaCrossover {
            fast_period: 30,
            slow_period: 10,
            indicator: MaKind::Sma,
        })
        .unwrap_err();
        assert!(matches!(err, RegistryError::BadParams(_)));
    }
}
