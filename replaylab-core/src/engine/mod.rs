//! The per-bar pipeline: execution, decision, orchestration.

pub mod core;
pub mod decision;
mod execution;

pub use self::core::{EndOfDataPolicy, EngineConfig, RunSummary, TradingEngine};
pub use decision::{decide, round_to_step, OrderInstruction, SizingConfig};
