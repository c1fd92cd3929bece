//! Position — current signed exposure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Signed exposure: positive = long, negative = short, zero = flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub size: f64,
    pub avg_entry_price: f64,
    pub entry_ts: Option<DateTime<Utc>>,
}

impl Position {
    pub fn flat() -> Self {
        Self {
            size: 0.0,
            avg_entry_price: 0.0,
            entry_ts: None,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.size == 0.0
    }

    pub fn is_long(&self) -> bool {
        self.size > 0.0
    }

    pub fn is_short(&self) -> bool {
        self.size < 0.0
    }

    /// Unrealized P&L marked at `price`. Zero when flat.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        if self.is_long() {
            (price - self.avg_entry_price) * self.size.abs()
        } else if self.is_short() {
            (self.avg_entry_price - price) * self.size.abs()
        } else {
            0.0
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::flat()
    }
}
