//! Bar — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV observation for a fixed time interval.
///
/// Timestamps are UTC, nanosecond-normalized by the replay layer. `spread`
/// is the quoted spread in price points; `real_volume` is only present for
/// instruments whose feed reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub tick_volume: u64,
    pub spread: f64,
    pub real_volume: Option<u64>,
}

impl Bar {
    /// Returns true if any OHLC field is NaN.
    pub fn has_nan(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// OHLC relationship check: `low <= open,close <= high`.
    pub fn is_sane(&self) -> bool {
        if self.has_nan() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}
