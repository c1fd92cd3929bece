//! Decision layer: Signal + RiskDirective → OrderInstruction.
//!
//! Pure, no state. The directive is authoritative over the signal: an active
//! flatten or halt forces target 0 regardless of what the model believes.

use serde::{Deserialize, Serialize};

use crate::domain::Signal;
use crate::risk::RiskDirective;

/// Position sizing parameters, immutable for a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizingConfig {
    /// Base position size for a full-strength directional signal.
    pub unit_size: f64,
    /// Minimum tradable increment; targets are rounded to a multiple of it.
    pub lot_step: f64,
    /// Scale unit_size by signal strength (clamped to [0, 1]) instead of
    /// trading fixed size on any directional signal.
    pub strength_scaling: bool,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            unit_size: 1.0,
            lot_step: 0.0,
            strength_scaling: false,
        }
    }
}

/// The concrete sizing action derived from one bar's belief plus risk state.
/// Resolved against the NEXT bar's open, never the current bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderInstruction {
    /// Absolute signed position to hold after execution.
    pub target_position: f64,
    pub reason: String,
}

/// Convert one bar's signal and risk directive into an instruction.
pub fn decide(
    signal: &Signal,
    directive: &RiskDirective,
    current_position: f64,
    sizing: &SizingConfig,
) -> OrderInstruction {
    if directive.halted || directive.flatten {
        return OrderInstruction {
            target_position: 0.0,
            reason: format!("risk:{}", directive.reason),
        };
    }

    let scale = if sizing.strength_scaling {
        signal.strength.clamp(0.0, 1.0)
    } else if signal.direction.is_directional() {
        1.0
    } else {
        0.0
    };
    let target = round_to_step(sizing.unit_size * signal.direction.sign() * scale, sizing.lot_step);

    let reason = if target == current_position {
        "hold".to_string()
    } else {
        signal.reason.clone()
    };
    OrderInstruction {
        target_position: target,
        reason,
    }
}

/// Round to the nearest multiple of `step`; a non-positive step disables
/// rounding.
pub fn round_to_step(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Signal;
    use crate::risk::RiskDirective;

    fn sizing(unit: f64) -> SizingConfig {
        SizingConfig {
            unit_size: unit,
            lot_step: 0.0,
            strength_scaling: false,
        }
    }

    #[test]
    fn flatten_overrides_signal() {
        let directive = RiskDirective {
            flatten: true,
            halted: false,
            reason: "daily loss 0.0600 >= limit 0.0500".to_string(),
        };
        let out = decide(&Signal::long("cross_above"), &directive, 1.0, &sizing(1.0));
        assert_eq!(out.target_position, 0.0);
        assert_eq!(out.reason, "risk:daily loss 0.0600 >= limit 0.0500");
    }

    #[test]
    fn directional_signal_sizes_by_unit() {
        let out = decide(
            &Signal::short("cross_below"),
            &RiskDirective::clear(),
            0.0,
            &sizing(2.0),
        );
        assert_eq!(out.target_position, -2.0);
        assert_eq!(out.reason, "cross_below");
    }

    #[test]
    fn unchanged_target_reads_hold() {
        let out = decide(&Signal::long("cross_above"), &RiskDirective::clear(), 1.0, &sizing(1.0));
        assert_eq!(out.target_position, 1.0);
        assert_eq!(out.reason, "hold");
    }

    #[test]
    fn strength_scaling_clamps_and_scales() {
        let cfg = SizingConfig {
            unit_size: 10.0,
            lot_step: 0.0,
            strength_scaling: true,
        };
        let mut sig = Signal::long("x");
        sig.strength = 0.25;
        assert_eq!(decide(&sig, &RiskDirective::clear(), 0.0, &cfg).target_position, 2.5);
        sig.strength = 7.0;
        assert_eq!(decide(&sig, &RiskDirective::clear(), 0.0, &cfg).target_position, 10.0);
    }

    #[test]
    fn lot_step_rounds_target() {
        let cfg = SizingConfig {
            unit_size: 1.0,
            lot_step: 0.1,
            strength_scaling: true,
        };
        let mut sig = Signal::long("x");
        sig.strength = 0.333;
        let out = decide(&sig, &RiskDirective::clear(), 0.0, &cfg);
        assert!((out.target_position - 0.3).abs() < 1e-12);
    }

    #[test]
    fn decide_is_pure() {
        let sig = Signal::long("cross_above");
        let dir = RiskDirective::clear();
        let cfg = sizing(1.0);
        let a = decide(&sig, &dir, 0.0, &cfg);
        let b = decide(&sig, &dir, 0.0, &cfg);
        assert_eq!(a, b);
    }
}
