//! Risk layer: drawdown tracking and the per-bar risk gate.

pub mod drawdown;
pub mod manager;

pub use drawdown::{compute_drawdown, DrawdownState, DrawdownTracker};
pub use manager::{RiskConfig, RiskDirective, RiskManager, RiskSummary};
