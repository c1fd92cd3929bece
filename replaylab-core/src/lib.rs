//! Deterministic bar-replay engine.
//!
//! The core is single-threaded and synchronous by construction: validated
//! bars tick through a fixed per-bar pipeline in which the previous bar's
//! instruction executes at the current bar's open, mark-to-market happens at
//! the close, and risk state resolves before the strategy is consulted.
//! Everything stateful (position, pending instruction, equity and fill logs,
//! risk calendar) is owned by one run; two runs over the same inputs produce
//! byte-identical logs.
//!
//! I/O lives with external collaborators. The engine consumes a validated
//! [`replay::BarSequence`] plus a [`features::FeatureMatrix`] and emits a
//! [`engine::RunSummary`]; loading raw frames and persisting artifacts is the
//! runner's job.

pub mod domain;
pub mod engine;
pub mod error;
pub mod features;
pub mod replay;
pub mod risk;
pub mod strategy;

pub use domain::{Bar, Direction, EquitySnapshot, Fill, Position, Side, Signal};
pub use engine::{
    decide, round_to_step, EndOfDataPolicy, EngineConfig, OrderInstruction, RunSummary,
    SizingConfig, TradingEngine,
};
pub use error::EngineError;
pub use features::{FeatureError, FeatureMatrix, FeatureProvider, FeatureRow};
pub use replay::{BarSequence, ValidationError, ValidationMode, ValidationReport};
pub use risk::{DrawdownState, DrawdownTracker, RiskConfig, RiskDirective, RiskManager, RiskSummary};
pub use strategy::{Strategy, StrategyContext, StrategyError};
