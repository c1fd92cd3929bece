//! Property-based invariants for validation, drawdown, and decision logic.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use replaylab_core::{
    decide, round_to_step, Bar, BarSequence, Direction, DrawdownTracker, RiskDirective, Signal,
    SizingConfig, ValidationMode,
};

fn bar_at(ts_offset_hours: i64, price: f64) -> Bar {
    Bar {
        timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
            + Duration::hours(ts_offset_hours),
        open: price,
        high: price + 1.0,
        low: price - 1.0,
        close: price,
        tick_volume: 1,
        spread: 0.1,
        real_volume: None,
    }
}

proptest! {
    #[test]
    fn peak_is_monotonic_and_drawdown_bounded(equities in prop::collection::vec(1.0f64..1e9, 1..200)) {
        let mut tracker = DrawdownTracker::new(equities[0]);
        let mut last_peak = tracker.peak_equity();
        for &e in &equities {
            let dd = tracker.update(e);
            prop_assert!(tracker.peak_equity() >= last_peak);
            prop_assert!(dd >= 0.0);
            prop_assert!(dd < 1.0);
            prop_assert!(tracker.max_drawdown() >= dd);
            last_peak = tracker.peak_equity();
        }
    }

    #[test]
    fn max_drawdown_matches_full_recomputation(equities in prop::collection::vec(1.0f64..1e6, 1..200)) {
        let mut tracker = DrawdownTracker::new(equities[0]);
        for &e in &equities {
            tracker.update(e);
        }

        let mut peak = equities[0];
        let mut max_dd = 0.0f64;
        for &e in &equities {
            peak = peak.max(e);
            max_dd = max_dd.max((peak - e) / peak);
        }
        prop_assert!((tracker.max_drawdown() - max_dd).abs() < 1e-9);
    }

    #[test]
    fn validated_sequences_are_strictly_increasing(offsets in prop::collection::vec(0i64..500, 1..100)) {
        let bars: Vec<Bar> = offsets.iter().map(|&h| bar_at(h, 100.0)).collect();
        let seq = BarSequence::from_bars(bars, ValidationMode::Strict).unwrap();
        let stamps: Vec<_> = seq.bars().iter().map(|b| b.timestamp).collect();
        for pair in stamps.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn decide_is_deterministic_and_risk_dominant(
        strength in -2.0f64..3.0,
        unit in 0.1f64..100.0,
        position in -100.0f64..100.0,
        flatten in any::<bool>(),
        halted in any::<bool>(),
        long in any::<bool>(),
    ) {
        let signal = Signal {
            direction: if long { Direction::Long } else { Direction::Short },
            strength,
            reason: "prop".to_string(),
        };
        let directive = RiskDirective {
            flatten,
            halted,
            reason: "limit".to_string(),
        };
        let sizing = SizingConfig {
            unit_size: unit,
            lot_step: 0.0,
            strength_scaling: true,
        };

        let a = decide(&signal, &directive, position, &sizing);
        let b = decide(&signal, &directive, position, &sizing);
        prop_assert_eq!(&a, &b);

        if flatten || halted {
            prop_assert_eq!(a.target_position, 0.0);
        } else {
            prop_assert!(a.target_position.abs() <= unit + 1e-12);
        }
    }

    #[test]
    fn rounded_targets_are_step_multiples(value in -1e3f64..1e3, step in 0.001f64..10.0) {
        let rounded = round_to_step(value, step);
        let ratio = rounded / step;
        prop_assert!((ratio - ratio.round()).abs() < 1e-6);
        prop_assert!((rounded - value).abs() <= step / 2.0 + 1e-9);
    }
}

#[test]
fn duplicate_timestamps_collapse_keep_first() {
    let bars = vec![bar_at(0, 100.0), bar_at(0, 999.0), bar_at(1, 101.0)];
    let seq = BarSequence::from_bars(bars, ValidationMode::Strict).unwrap();
    assert_eq!(seq.len(), 2);
    assert_eq!(seq.bars()[0].open, 100.0);
    assert_eq!(seq.report().duplicates_dropped, 1);
}
