//! TradingEngine: the per-bar orchestrator.
//!
//! Each bar runs seven stages in strict order: execution-at-open,
//! mark-to-market-at-close, risk check, snapshot record, belief, decision,
//! instruction store. The stored instruction resolves at the NEXT bar's
//! open, which is the anti-look-ahead invariant everything else leans on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::decision::{decide, OrderInstruction, SizingConfig};
use super::execution::FillBook;
use crate::domain::{Bar, EquitySnapshot, Fill, Position};
use crate::error::EngineError;
use crate::features::{FeatureMatrix, FeatureRow};
use crate::replay::BarSequence;
use crate::risk::{compute_drawdown, DrawdownState, RiskConfig, RiskManager, RiskSummary};
use crate::strategy::{validate_features, Strategy, StrategyContext};

/// What to do with a position still open when the data runs out.
///
/// Recorded in the run summary so the choice is auditable, never implicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndOfDataPolicy {
    /// Discard the pending instruction; the final fill stays open and its
    /// P&L remains unrealized in the ending equity.
    #[default]
    Discard,
    /// Force-close the open position at the final bar's close price.
    FlattenAtClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub starting_capital: f64,
    pub sizing: SizingConfig,
    pub end_of_data: EndOfDataPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_capital: 10_000.0,
            sizing: SizingConfig::default(),
            end_of_data: EndOfDataPolicy::default(),
        }
    }
}

/// Everything a completed run emits. Snapshot and fill logs are append-only
/// and already in bar order; the artifact writer persists them verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub starting_capital: f64,
    pub ending_equity: f64,
    pub n_bars: usize,
    pub end_of_data: EndOfDataPolicy,
    pub snapshots: Vec<EquitySnapshot>,
    pub fills: Vec<Fill>,
    pub drawdown: DrawdownState,
    pub risk: RiskSummary,
}

/// Single-run, single-threaded replay engine. Owns position, equity,
/// pending-instruction, and log state exclusively; nothing is shared across
/// runs.
pub struct TradingEngine {
    cfg: EngineConfig,
    strategy: Box<dyn Strategy>,
    risk: RiskManager,

    /// Realized equity: starting capital plus realized P&L.
    cash: f64,
    position: Position,
    pending: Option<OrderInstruction>,
    book: FillBook,
    snapshots: Vec<EquitySnapshot>,
    last_close: Option<(DateTime<Utc>, f64)>,
    bars_seen: usize,
}

impl TradingEngine {
    pub fn new(cfg: EngineConfig, risk_cfg: RiskConfig, strategy: Box<dyn Strategy>) -> Self {
        let risk = RiskManager::new(risk_cfg, cfg.starting_capital);
        Self {
            cash: cfg.starting_capital,
            cfg,
            strategy,
            risk,
            position: Position::flat(),
            pending: None,
            book: FillBook::default(),
            snapshots: Vec::new(),
            last_close: None,
            bars_seen: 0,
        }
    }

    /// Drive a full replay: validate strategy features, tick every bar, then
    /// reconcile and summarize.
    pub fn run(
        cfg: EngineConfig,
        risk_cfg: RiskConfig,
        strategy: Box<dyn Strategy>,
        bars: &BarSequence,
        features: &FeatureMatrix,
    ) -> Result<RunSummary, EngineError> {
        let mut engine = Self::new(cfg, risk_cfg, strategy);
        validate_features(engine.strategy.as_ref(), features)
            .map_err(|e| EngineError::Strategy {
                bar_index: 0,
                source: Box::new(e),
            })?;
        let n = bars.len();
        if features.len() != n {
            return Err(EngineError::Integrity(format!(
                "feature matrix has {} rows for {} bars",
                features.len(),
                n
            )));
        }
        for (i, bar) in bars.iter().enumerate() {
            engine.process_bar(bar, features.row(i), i, i + 1 == n)?;
        }
        engine.finish()
    }

    /// Process one bar through the seven-stage pipeline.
    pub fn process_bar(
        &mut self,
        bar: &Bar,
        features: FeatureRow<'_>,
        bar_index: usize,
        is_last: bool,
    ) -> Result<(), EngineError> {
        // 1. Execution at open: resolve the instruction stored on the
        //    previous bar. Only the open price is visible here.
        let target = self
            .pending
            .take()
            .map(|i| i.target_position)
            .unwrap_or(self.position.size);
        let realized =
            self.book
                .execute_at_open(&mut self.position, target, bar.open, bar.timestamp);
        self.cash += realized;

        // 2. Mark-to-market at close.
        let unrealized = self.position.unrealized_pnl(bar.close);
        let equity = self.cash + unrealized;

        // 3. Risk check.
        let directive = self.risk.update(bar.timestamp, equity);
        if !directive.reason.is_empty() {
            warn!(ts = %bar.timestamp, reason = %directive.reason, "risk directive");
        }

        // 4. Record. Append-only; never touched again.
        self.snapshots.push(EquitySnapshot {
            timestamp: bar.timestamp,
            equity,
            position: self.position.size,
            realized_pnl: self.cash - self.cfg.starting_capital,
            unrealized_pnl: unrealized,
            drawdown: self.risk.drawdown().current_drawdown,
        });

        self.bars_seen += 1;
        self.last_close = Some((bar.timestamp, bar.close));

        if is_last {
            // No next bar to execute against; end-of-data handling happens
            // in finish().
            self.pending = None;
            return Ok(());
        }

        // 5. Belief. The strategy sees risk state already resolved.
        let ctx = StrategyContext {
            ts: bar.timestamp,
            bar,
            features,
            position: self.position.size,
            equity,
            bar_index,
        };
        let signal = self
            .strategy
            .on_bar(&ctx)
            .map_err(|e| EngineError::Strategy {
                bar_index,
                source: Box::new(e),
            })?;
        debug!(
            ts = %bar.timestamp,
            direction = ?signal.direction,
            reason = %signal.reason,
            "signal"
        );

        // 6 + 7. Decision, then store for the next bar's open.
        self.pending = Some(decide(
            &signal,
            &directive,
            self.position.size,
            &self.cfg.sizing,
        ));
        Ok(())
    }

    /// Apply the end-of-data policy, reconcile the drawdown log, and emit the
    /// run summary. Consumes the engine; a failed reconciliation yields no
    /// summary at all.
    pub fn finish(mut self) -> Result<RunSummary, EngineError> {
        if self.cfg.end_of_data == EndOfDataPolicy::FlattenAtClose {
            if let Some((ts, close)) = self.last_close {
                if !self.position.is_flat() {
                    // Closing at the same price the last MTM used keeps
                    // equity unchanged; unrealized becomes realized.
                    self.cash += self.book.force_close(&mut self.position, close, ts);
                }
            }
        }

        self.reconcile()?;

        let ending_equity = match self.snapshots.last() {
            Some(s) => s.equity,
            None => self.cfg.starting_capital,
        };
        Ok(RunSummary {
            starting_capital: self.cfg.starting_capital,
            ending_equity,
            n_bars: self.bars_seen,
            end_of_data: self.cfg.end_of_data,
            snapshots: self.snapshots,
            fills: self.book.into_fills(),
            drawdown: self.risk.drawdown(),
            risk: self.risk.summary(),
        })
    }

    /// Recompute peak/drawdown independently from the snapshot log and
    /// compare against the tracker. A mismatch is an internal bug, reported
    /// distinctly from input-data errors.
    fn reconcile(&self) -> Result<(), EngineError> {
        const TOL: f64 = 1e-9;

        let mut peak = self.cfg.starting_capital;
        let mut max_dd = 0.0f64;
        let mut last_dd = 0.0f64;
        for snap in &self.snapshots {
            if snap.equity > peak {
                peak = snap.equity;
            }
            last_dd = compute_drawdown(peak, snap.equity);
            max_dd = max_dd.max(last_dd);

            if (snap.drawdown - last_dd).abs() > TOL {
                return Err(EngineError::Integrity(format!(
                    "snapshot at {} records drawdown {} but recomputation gives {}",
                    snap.timestamp, snap.drawdown, last_dd
                )));
            }
        }

        let tracked = self.risk.drawdown();
        if (tracked.max_drawdown - max_dd).abs() > TOL {
            return Err(EngineError::Integrity(format!(
                "tracked max drawdown {} disagrees with recomputed {}",
                tracked.max_drawdown, max_dd
            )));
        }
        if !self.snapshots.is_empty() && (tracked.current_drawdown - last_dd).abs() > TOL {
            return Err(EngineError::Integrity(format!(
                "tracked current drawdown {} disagrees with recomputed {}",
                tracked.current_drawdown, last_dd
            )));
        }
        Ok(())
    }

    pub fn equity(&self) -> f64 {
        match self.snapshots.last() {
            Some(s) => s.equity,
            None => self.cfg.starting_capital,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn fills(&self) -> &[Fill] {
        self.book.fills()
    }

    pub fn snapshots(&self) -> &[EquitySnapshot] {
        &self.snapshots
    }
}
