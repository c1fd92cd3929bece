//! Execution-at-open: resolving the previous bar's instruction against the
//! current bar's open price.

use chrono::{DateTime, Utc};

use crate::domain::{Fill, Position, Side};

/// Book-keeping for fills over one run. Fills are created open at entry and
/// completed in place at exit; the log is append-only.
#[derive(Debug, Default)]
pub(crate) struct FillBook {
    fills: Vec<Fill>,
    open_fill: Option<usize>,
}

impl FillBook {
    /// Move `position` to `target` at `open_price`, returning realized P&L.
    ///
    /// Any change routes through flat: the existing position closes entirely
    /// at the open, then the target (if nonzero) opens fresh at the same
    /// price. Resizes and flips therefore always produce a completed fill
    /// plus a new open one.
    pub fn execute_at_open(
        &mut self,
        position: &mut Position,
        target: f64,
        open_price: f64,
        ts: DateTime<Utc>,
    ) -> f64 {
        if position.size == target {
            return 0.0;
        }

        let mut realized = 0.0;
        if !position.is_flat() {
            if let Some(idx) = self.open_fill.take() {
                self.fills[idx].close(ts, open_price);
                realized += self.fills[idx].pnl;
            }
            *position = Position::flat();
        }

        if target != 0.0 {
            let side = if target > 0.0 { Side::Long } else { Side::Short };
            self.fills.push(Fill::open(ts, side, target.abs(), open_price));
            self.open_fill = Some(self.fills.len() - 1);
            position.size = target;
            position.avg_entry_price = open_price;
            position.entry_ts = Some(ts);
        }

        realized
    }

    /// Close any open fill at `price` without going through an instruction.
    /// Used by the flatten-at-close end-of-data policy.
    pub fn force_close(&mut self, position: &mut Position, price: f64, ts: DateTime<Utc>) -> f64 {
        self.execute_at_open(position, 0.0, price, ts)
    }

    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    pub fn into_fills(self) -> Vec<Fill> {
        self.fills
    }
}
