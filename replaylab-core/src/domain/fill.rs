//! Fill — a position change resolved against a bar's open price.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Side of a fill, from the position's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

/// One position change. Created open at entry (exit fields `None`) and
/// completed in place when the position is closed; `pnl` is realized at exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub entry_ts: DateTime<Utc>,
    pub exit_ts: Option<DateTime<Utc>>,
    pub side: Side,
    pub qty: f64,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub pnl: f64,
}

impl Fill {
    pub fn open(entry_ts: DateTime<Utc>, side: Side, qty: f64, entry_price: f64) -> Self {
        Self {
            entry_ts,
            exit_ts: None,
            side,
            qty,
            entry_price,
            exit_price: None,
            pnl: 0.0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.exit_ts.is_none()
    }

    /// Complete the fill at `exit_price`, realizing P&L.
    pub fn close(&mut self, exit_ts: DateTime<Utc>, exit_price: f64) {
        self.exit_ts = Some(exit_ts);
        self.exit_price = Some(exit_price);
        self.pnl = match self.side {
            Side::Long => (exit_price - self.entry_price) * self.qty,
            Side::Short => (self.entry_price - exit_price) * self.qty,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, h, 0, 0).unwrap()
    }

    #[test]
    fn open_fill_has_no_exit() {
        let fill = Fill::open(ts(0), Side::Long, 1.0, 2000.0);
        assert!(fill.is_open());
        assert_eq!(fill.pnl, 0.0);
    }

    #[test]
    fn close_realizes_long_pnl() {
        let mut fill = Fill::open(ts(0), Side::Long, 2.0, 100.0);
        fill.close(ts(1), 110.0);
        assert!(!fill.is_open());
        assert_eq!(fill.exit_price, Some(110.0));
        assert_eq!(fill.pnl, 20.0);
    }

    #[test]
    fn close_realizes_short_pnl() {
        let mut fill = Fill::open(ts(0), Side::Short, 1.5, 100.0);
        fill.close(ts(1), 90.0);
        assert_eq!(fill.pnl, 15.0);
    }
}
