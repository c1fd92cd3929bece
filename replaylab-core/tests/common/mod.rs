//! Shared fixtures for engine integration tests.
#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use replaylab_core::{
    Bar, BarSequence, FeatureMatrix, Signal, Strategy, StrategyContext, StrategyError,
    ValidationMode,
};

pub fn base_ts() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
}

/// Synthetic hourly bars from a deterministic pseudo-random walk (LCG).
pub fn make_bars(n: usize) -> Vec<Bar> {
    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0f64;

    for i in 0..n {
        let seed = (i as u64)
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let change = ((seed % 200) as f64 - 100.0) * 0.05; // -5.0 to +5.0
        price = (price + change).max(10.0);

        let open = price - 0.5;
        // Vary the close direction so momentum-style strategies flip.
        let close = if seed & 8 == 0 { price + 0.3 } else { price - 0.9 };
        bars.push(Bar {
            timestamp: base_ts() + Duration::hours(i as i64),
            open,
            high: open.max(close) + 2.0,
            low: open.min(close) - 2.0,
            close,
            tick_volume: 1_000 + i as u64,
            spread: 0.2,
            real_volume: None,
        });
    }

    bars
}

/// Hourly bars with explicit open/close pairs, for hand-built scenarios.
pub fn bars_from_ohlc(pairs: &[(f64, f64)]) -> Vec<Bar> {
    pairs
        .iter()
        .enumerate()
        .map(|(i, &(open, close))| Bar {
            timestamp: base_ts() + Duration::hours(i as i64),
            open,
            high: open.max(close) + 1.0,
            low: open.min(close) - 1.0,
            close,
            tick_volume: 100,
            spread: 0.1,
            real_volume: None,
        })
        .collect()
}

pub fn sequence(bars: Vec<Bar>) -> BarSequence {
    BarSequence::from_bars(bars, ValidationMode::Strict).unwrap()
}

pub fn no_features(n: usize) -> FeatureMatrix {
    FeatureMatrix::empty(n)
}

/// Goes long on every bar.
pub struct AlwaysLong;

impl Strategy for AlwaysLong {
    fn name(&self) -> &str {
        "always_long"
    }

    fn required_features(&self) -> Vec<String> {
        Vec::new()
    }

    fn on_bar(&mut self, _ctx: &StrategyContext<'_>) -> Result<Signal, StrategyError> {
        Ok(Signal::long("bullish"))
    }
}

/// Long when the bar closed up, short when it closed down. Reads the close,
/// which makes it sensitive to any close-price look-ahead leak.
pub struct Momentum;

impl Strategy for Momentum {
    fn name(&self) -> &str {
        "momentum"
    }

    fn required_features(&self) -> Vec<String> {
        Vec::new()
    }

    fn on_bar(&mut self, ctx: &StrategyContext<'_>) -> Result<Signal, StrategyError> {
        if ctx.bar.close > ctx.bar.open {
            Ok(Signal::long("closed_up"))
        } else if ctx.bar.close < ctx.bar.open {
            Ok(Signal::short("closed_down"))
        } else {
            Ok(Signal::flat("unchanged"))
        }
    }
}

/// Fails at a chosen bar index, flat everywhere else.
pub struct FailsAt(pub usize);

impl Strategy for FailsAt {
    fn name(&self) -> &str {
        "fails_at"
    }

    fn required_features(&self) -> Vec<String> {
        Vec::new()
    }

    fn on_bar(&mut self, ctx: &StrategyContext<'_>) -> Result<Signal, StrategyError> {
        if ctx.bar_index == self.0 {
            Err(StrategyError::Other("injected failure".to_string()))
        } else {
            Ok(Signal::flat("noop"))
        }
    }
}
