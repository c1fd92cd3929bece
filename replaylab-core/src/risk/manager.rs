//! Per-run risk orchestration: global halt plus calendar pauses.
//!
//! The engine calls [`RiskManager::update`] once per bar, after
//! mark-to-market, and obeys the returned directive on the same bar's
//! decision. Because execution is next-bar-open, a flatten requested here
//! closes at the following bar's open.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::drawdown::{compute_drawdown, DrawdownState, DrawdownTracker};

/// Risk thresholds, all fractional (0.10 = 10%). `None` disables a check.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Permanent halt once cumulative drawdown from peak reaches this.
    pub max_drawdown: Option<f64>,
    /// Pause until the next UTC day once intraday loss reaches this.
    pub daily_loss_limit: Option<f64>,
    /// Pause until the next UTC month once month-to-date loss reaches this.
    pub monthly_loss_limit: Option<f64>,
}

/// The risk layer's instruction for the current bar.
///
/// Authoritative over any strategy signal: `flatten` forces target
/// position 0, and `halted` implies `flatten` unconditionally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskDirective {
    pub flatten: bool,
    pub halted: bool,
    /// Names the triggering rule(s); empty when no rule is active.
    pub reason: String,
}

impl RiskDirective {
    pub fn clear() -> Self {
        Self {
            flatten: false,
            halted: false,
            reason: String::new(),
        }
    }
}

/// End-of-run risk accounting for the metrics artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub max_drawdown: f64,
    pub risk_halted: bool,
    pub risk_halted_at: Option<DateTime<Utc>>,
    pub daily_loss_limit: Option<f64>,
    pub monthly_loss_limit: Option<f64>,
    pub daily_halts: u32,
    pub monthly_halts: u32,
}

/// Stateful risk gate for one run.
///
/// The global halt is terminal. Daily and monthly pauses clear at the first
/// bar of a new UTC day/month, with the period baseline taken from the
/// previous bar's mark-to-market equity so unrealized P&L carries into the
/// new period.
#[derive(Debug)]
pub struct RiskManager {
    cfg: RiskConfig,
    tracker: DrawdownTracker,

    halted: bool,
    halted_at: Option<DateTime<Utc>>,

    daily_paused: bool,
    current_day: Option<NaiveDate>,
    day_start_equity: f64,
    daily_halts: u32,

    monthly_paused: bool,
    current_month: Option<(i32, u32)>,
    month_start_equity: f64,
    monthly_halts: u32,

    last_equity: f64,
}

impl RiskManager {
    pub fn new(cfg: RiskConfig, starting_capital: f64) -> Self {
        Self {
            cfg,
            tracker: DrawdownTracker::new(starting_capital),
            halted: false,
            halted_at: None,
            daily_paused: false,
            current_day: None,
            day_start_equity: starting_capital,
            daily_halts: 0,
            monthly_paused: false,
            current_month: None,
            month_start_equity: starting_capital,
            monthly_halts: 0,
            last_equity: starting_capital,
        }
    }

    /// Process one bar's mark-to-market equity and return the directive.
    pub fn update(&mut self, ts: DateTime<Utc>, equity: f64) -> RiskDirective {
        let mut reasons: Vec<String> = Vec::new();

        // Period boundaries reset pauses and rebase against the previous
        // bar's MTM equity.
        let day = ts.date_naive();
        if self.current_day != Some(day) {
            self.daily_paused = false;
            self.current_day = Some(day);
            self.day_start_equity = self.last_equity;
        }
        let month = (ts.year(), ts.month());
        if self.current_month != Some(month) {
            self.monthly_paused = false;
            self.current_month = Some(month);
            self.month_start_equity = self.last_equity;
        }

        let global_dd = self.tracker.update(equity);
        if !self.halted {
            if let Some(limit) = self.cfg.max_drawdown {
                if global_dd >= limit {
                    self.halted = true;
                    self.halted_at = Some(ts);
                    info!(%ts, drawdown = global_dd, limit, "global drawdown halt");
                    reasons.push(format!("global drawdown {global_dd:.4} >= limit {limit:.4}"));
                }
            }
        }

        if !self.daily_paused && self.day_start_equity > 0.0 {
            if let Some(limit) = self.cfg.daily_loss_limit {
                let dd = compute_drawdown(self.day_start_equity, equity);
                if dd >= limit {
                    self.daily_paused = true;
                    self.daily_halts += 1;
                    info!(%ts, drawdown = dd, limit, "daily loss pause");
                    reasons.push(format!("daily loss {dd:.4} >= limit {limit:.4}"));
                }
            }
        }

        if !self.monthly_paused && self.month_start_equity > 0.0 {
            if let Some(limit) = self.cfg.monthly_loss_limit {
                let dd = compute_drawdown(self.month_start_equity, equity);
                if dd >= limit {
                    self.monthly_paused = true;
                    self.monthly_halts += 1;
                    info!(%ts, drawdown = dd, limit, "monthly loss pause");
                    reasons.push(format!("monthly loss {dd:.4} >= limit {limit:.4}"));
                }
            }
        }

        let flatten = self.halted || self.daily_paused || self.monthly_paused;
        if flatten && reasons.is_empty() {
            // Persisting state from an earlier bar, no fresh breach.
            if self.halted {
                reasons.push("global halt active".to_string());
            }
            if self.daily_paused {
                reasons.push("daily pause active".to_string());
            }
            if self.monthly_paused {
                reasons.push("monthly pause active".to_string());
            }
        }

        self.last_equity = equity;

        RiskDirective {
            flatten,
            halted: self.halted,
            reason: reasons.join("; "),
        }
    }

    pub fn drawdown(&self) -> DrawdownState {
        self.tracker.state()
    }

    pub fn summary(&self) -> RiskSummary {
        RiskSummary {
            max_drawdown: self.tracker.max_drawdown(),
            risk_halted: self.halted,
            risk_halted_at: self.halted_at,
            daily_loss_limit: self.cfg.daily_loss_limit,
            monthly_loss_limit: self.cfg.monthly_loss_limit,
            daily_halts: self.daily_halts,
            monthly_halts: self.monthly_halts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn no_limits_means_clear_directives() {
        let mut rm = RiskManager::new(RiskConfig::default(), 10_000.0);
        let d = rm.update(ts(1, 0), 5_000.0);
        assert!(!d.flatten);
        assert!(!d.halted);
        assert!(d.reason.is_empty());
    }

    #[test]
    fn global_halt_is_permanent() {
        let cfg = RiskConfig {
            max_drawdown: Some(0.10),
            ..RiskConfig::default()
        };
        let mut rm = RiskManager::new(cfg, 10_000.0);
        assert!(!rm.update(ts(1, 0), 9_500.0).halted);
        let d = rm.update(ts(1, 1), 8_900.0);
        assert!(d.halted);
        assert!(d.flatten);
        assert!(d.reason.contains("global drawdown"));
        // Recovery above the threshold does not clear the halt.
        let d = rm.update(ts(2, 0), 11_000.0);
        assert!(d.halted);
        assert!(d.flatten);
        assert_eq!(d.reason, "global halt active");
    }

    #[test]
    fn daily_pause_clears_at_next_utc_day() {
        let cfg = RiskConfig {
            daily_loss_limit: Some(0.05),
            ..RiskConfig::default()
        };
        let mut rm = RiskManager::new(cfg, 10_000.0);
        let d = rm.update(ts(1, 0), 9_400.0);
        assert!(d.flatten);
        assert!(!d.halted);
        assert!(d.reason.contains("daily loss"));
        // Still paused for the rest of the day.
        assert!(rm.update(ts(1, 5), 9_800.0).flatten);
        // New UTC day: pause clears, baseline is previous bar's equity.
        let d = rm.update(ts(2, 0), 9_700.0);
        assert!(!d.flatten);
    }

    #[test]
    fn daily_baseline_is_previous_bar_mtm_equity() {
        let cfg = RiskConfig {
            daily_loss_limit: Some(0.05),
            ..RiskConfig::default()
        };
        let mut rm = RiskManager::new(cfg, 10_000.0);
        assert!(!rm.update(ts(1, 23), 12_000.0).flatten);
        // Next day baseline is 12000, so 11300 is a 5.8% daily loss even
        // though it is above starting capital.
        let d = rm.update(ts(2, 0), 11_300.0);
        assert!(d.flatten);
        assert!(d.reason.contains("daily loss"));
    }

    #[test]
    fn monthly_pause_counts_and_clears() {
        let cfg = RiskConfig {
            monthly_loss_limit: Some(0.10),
            ..RiskConfig::default()
        };
        let mut rm = RiskManager::new(cfg, 10_000.0);
        assert!(rm.update(ts(5, 0), 8_900.0).flatten);
        assert!(rm.update(ts(20, 0), 9_900.0).flatten);
        // April clears the pause; baseline becomes 9900.
        let d = rm.update(Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(), 9_500.0);
        assert!(!d.flatten);
        assert_eq!(rm.summary().monthly_halts, 1);
    }

    #[test]
    fn halted_dominates_reason_composition() {
        let cfg = RiskConfig {
            max_drawdown: Some(0.10),
            daily_loss_limit: Some(0.05),
            monthly_loss_limit: None,
        };
        let mut rm = RiskManager::new(cfg, 10_000.0);
        let d = rm.update(ts(1, 0), 8_500.0);
        assert!(d.halted);
        assert!(d.flatten);
        assert!(d.reason.contains("global drawdown"));
        assert!(d.reason.contains("daily loss"));
    }

    #[test]
    fn summary_reports_halt_timestamp() {
        let cfg = RiskConfig {
            max_drawdown: Some(0.10),
            ..RiskConfig::default()
        };
        let mut rm = RiskManager::new(cfg, 10_000.0);
        rm.update(ts(3, 7), 8_000.0);
        let s = rm.summary();
        assert!(s.risk_halted);
        assert_eq!(s.risk_halted_at, Some(ts(3, 7)));
        assert_eq!(s.max_drawdown, 0.2);
    }
}
