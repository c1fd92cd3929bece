//! EquitySnapshot — one append-only record per processed bar.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Equity/drawdown state after processing one bar. One snapshot per bar,
/// appended in bar order and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquitySnapshot {
    pub timestamp: DateTime<Utc>,
    /// Mark-to-market equity at this bar's close.
    pub equity: f64,
    /// Signed position size after execution-at-open.
    pub position: f64,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    /// Fractional drawdown from the running peak, >= 0.
    pub drawdown: f64,
}
