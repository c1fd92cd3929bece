//! Running peak-equity drawdown.
//!
//! Drawdowns are fractions of peak equity (0.10 means 10% below peak),
//! clamped to be non-negative. A non-positive peak yields 0 rather than a
//! meaningless ratio.

use serde::{Deserialize, Serialize};

/// Fractional drawdown of `equity` below `peak`.
pub fn compute_drawdown(peak: f64, equity: f64) -> f64 {
    if peak <= 0.0 {
        return 0.0;
    }
    ((peak - equity) / peak).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawdownState {
    pub peak_equity: f64,
    pub current_drawdown: f64,
    pub max_drawdown: f64,
}

/// Tracks peak equity and the worst drawdown seen over a run.
///
/// The peak never decreases; `max_drawdown` never decreases. Feed it one
/// mark-to-market equity per bar, in bar order.
#[derive(Debug, Clone)]
pub struct DrawdownTracker {
    peak_equity: f64,
    current_drawdown: f64,
    max_drawdown: f64,
}

impl DrawdownTracker {
    pub fn new(starting_equity: f64) -> Self {
        Self {
            peak_equity: starting_equity,
            current_drawdown: 0.0,
            max_drawdown: 0.0,
        }
    }

    /// Observe one equity mark; returns the drawdown after the update.
    pub fn update(&mut self, equity: f64) -> f64 {
        if equity > self.peak_equity {
            self.peak_equity = equity;
        }
        self.current_drawdown = compute_drawdown(self.peak_equity, equity);
        if self.current_drawdown > self.max_drawdown {
            self.max_drawdown = self.current_drawdown;
        }
        self.current_drawdown
    }

    pub fn state(&self) -> DrawdownState {
        DrawdownState {
            peak_equity: self.peak_equity,
            current_drawdown: self.current_drawdown,
            max_drawdown: self.max_drawdown,
        }
    }

    pub fn peak_equity(&self) -> f64 {
        self.peak_equity
    }

    pub fn current_drawdown(&self) -> f64 {
        self.current_drawdown
    }

    pub fn max_drawdown(&self) -> f64 {
        self.max_drawdown
    }
}
