//! Signal — the model's directional belief. NOT an execution instruction.
//!
//! The decision layer converts Signal → OrderInstruction based on risk state
//! and sizing; a Signal by itself never causes a trade.

use serde::{Deserialize, Serialize};

/// Directional belief for the current bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
    Flat,
}

impl Direction {
    /// +1.0 long, -1.0 short, 0.0 flat.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
            Direction::Flat => 0.0,
        }
    }

    pub fn is_directional(self) -> bool {
        matches!(self, Direction::Long | Direction::Short)
    }
}

/// Immutable model output, consumed by the decision layer on the same bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub direction: Direction,
    /// Confidence in [0, 1]; the decision layer clamps before sizing.
    pub strength: f64,
    /// Human-readable audit trail.
    pub reason: String,
}

impl Signal {
    pub fn long(reason: impl Into<String>) -> Self {
        Self {
            direction: Direction::Long,
            strength: 1.0,
            reason: reason.into(),
        }
    }

    pub fn short(reason: impl Into<String>) -> Self {
        Self {
            direction: Direction::Short,
            strength: 1.0,
            reason: reason.into(),
        }
    }

    pub fn flat(reason: impl Into<String>) -> Self {
        Self {
            direction: Direction::Flat,
            strength: 0.0,
            reason: reason.into(),
        }
    }
}
