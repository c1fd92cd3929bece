//! Run statistics — pure functions from the fill log to scalars.
//!
//! A "trade" is a completed fill (entry and exit both resolved). Fills left
//! open by the discard end-of-data policy do not count toward trade stats.

use chrono::{DateTime, Utc};
use replaylab_core::{Fill, RiskSummary, RunSummary};
use serde::{Deserialize, Serialize};

/// The `metrics.json` payload for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub run_id: String,
    pub symbol: String,
    pub timeframe: String,
    pub n_bars: usize,
    pub start_ts: Option<DateTime<Utc>>,
    pub end_ts: Option<DateTime<Utc>>,
    pub starting_capital: f64,
    pub ending_equity: f64,
    pub n_trades: usize,
    pub total_pnl: f64,
    pub win_rate: f64,
    pub average_win: f64,
    pub average_loss: f64,
    #[serde(flatten)]
    pub risk: RiskSummary,
}

impl RunMetrics {
    pub fn compute(run_id: &str, symbol: &str, timeframe: &str, summary: &RunSummary) -> Self {
        Self {
            run_id: run_id.to_string(),
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            n_bars: summary.n_bars,
            start_ts: summary.snapshots.first().map(|s| s.timestamp),
            end_ts: summary.snapshots.last().map(|s| s.timestamp),
            starting_capital: summary.starting_capital,
            ending_equity: summary.ending_equity,
            n_trades: closed(&summary.fills).count(),
            total_pnl: total_pnl(&summary.fills),
            win_rate: win_rate(&summary.fills),
            average_win: average_win(&summary.fills),
            average_loss: average_loss(&summary.fills),
            risk: summary.risk.clone(),
        }
    }
}

fn closed(fills: &[Fill]) -> impl Iterator<Item = &Fill> {
    fills.iter().filter(|f| !f.is_open())
}

/// Sum of realized P&L over completed trades.
pub fn total_pnl(fills: &[Fill]) -> f64 {
    closed(fills).map(|f| f.pnl).sum()
}

/// Fraction of completed trades with positive P&L; 0 with no trades.
pub fn win_rate(fills: &[Fill]) -> f64 {
    let n = closed(fills).count();
    if n == 0 {
        return 0.0;
    }
    closed(fills).filter(|f| f.pnl > 0.0).count() as f64 / n as f64
}

/// Mean P&L of winning trades; 0 with no winners.
pub fn average_win(fills: &[Fill]) -> f64 {
    mean(closed(fills).map(|f| f.pnl).filter(|p| *p > 0.0))
}

/// Mean P&L of losing trades (negative); 0 with no losers.
pub fn average_loss(fills: &[Fill]) -> f64 {
    mean(closed(fills).map(|f| f.pnl).filter(|p| *p < 0.0))
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values {
        sum += v;
        n += 1;
    }
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}
