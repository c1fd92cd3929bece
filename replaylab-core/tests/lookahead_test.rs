//! Anti-look-ahead tests.
//!
//! The fill resolved during bar t may depend only on the instruction from
//! bar t-1 and bar t's OPEN. Perturbing bar t's close/high/low must not
//! change anything that resolved at or before bar t's open.

mod common;

use common::{make_bars, no_features, sequence, Momentum};
use replaylab_core::{
    Bar, EndOfDataPolicy, EngineConfig, RiskConfig, RunSummary, SizingConfig, TradingEngine,
};

fn run(bars: Vec<Bar>) -> RunSummary {
    let seq = sequence(bars);
    TradingEngine::run(
        EngineConfig {
            starting_capital: 10_000.0,
            sizing: SizingConfig {
                unit_size: 1.0,
                lot_step: 0.0,
                strength_scaling: false,
            },
            end_of_data: EndOfDataPolicy::Discard,
        },
        RiskConfig::default(),
        Box::new(Momentum),
        &seq,
        &no_features(seq.len()),
    )
    .unwrap()
}

/// Flip bar `i` into a strong down-close without touching its open.
fn perturb(bar: &mut Bar) {
    bar.close = bar.open - 3.0;
    bar.high = bar.open + 5.0;
    bar.low = bar.close - 5.0;
}

#[test]
fn final_bar_close_cannot_move_any_fill() {
    let bars = make_bars(100);
    let baseline = run(bars.clone());

    let mut mutated = bars;
    let last = mutated.len() - 1;
    perturb(&mut mutated[last]);
    let changed = run(mutated);

    // The final bar never produces an instruction, so the entire fill log
    // must be identical.
    assert_eq!(baseline.fills, changed.fills);
    // Snapshots before the final bar are also untouched.
    assert_eq!(
        &baseline.snapshots[..last],
        &changed.snapshots[..last]
    );
}

#[test]
fn mid_bar_close_cannot_move_fills_resolved_at_its_open() {
    let bars = make_bars(100);
    let t = 50;
    let ts_t = bars[t].timestamp;
    let baseline = run(bars.clone());

    let mut mutated = bars;
    perturb(&mut mutated[t]);
    let changed = run(mutated);

    // Fill events resolved at or before bar t's open: entries and exits with
    // timestamp <= t. Later events may legitimately differ because bar t's
    // close feeds the signal that executes at t+1.
    let entries = |s: &RunSummary| {
        s.fills
            .iter()
            .filter(|f| f.entry_ts <= ts_t)
            .map(|f| (f.entry_ts, f.entry_price, f.qty, f.side))
            .collect::<Vec<_>>()
    };
    let exits = |s: &RunSummary| {
        s.fills
            .iter()
            .filter_map(|f| f.exit_ts.map(|ts| (ts, f.exit_price, f.pnl)))
            .filter(|(ts, _, _)| *ts <= ts_t)
            .collect::<Vec<_>>()
    };

    assert_eq!(entries(&baseline), entries(&changed));
    assert_eq!(exits(&baseline), exits(&changed));
    // Everything strictly before bar t is fully identical.
    assert_eq!(&baseline.snapshots[..t], &changed.snapshots[..t]);
    // Bar t's own snapshot still shows the same position, only its
    // mark-to-market differs.
    assert_eq!(baseline.snapshots[t].position, changed.snapshots[t].position);
    assert_eq!(
        baseline.snapshots[t].realized_pnl,
        changed.snapshots[t].realized_pnl
    );
}

#[test]
fn open_price_is_the_only_execution_input() {
    // Same opens, wildly different closes: fills entered at bar t's open
    // must carry the same entry price in both runs.
    let bars = make_bars(60);
    let baseline = run(bars.clone());

    let mut mutated = bars;
    let last = mutated.len() - 1;
    for bar in mutated.iter_mut().take(last).skip(1) {
        // Keep direction of the close so the signal stream is unchanged,
        // but move its magnitude.
        let dir = (bar.close - bar.open).signum();
        bar.close = bar.open + dir * 0.01;
        bar.high = bar.open.max(bar.close) + 2.0;
        bar.low = bar.open.min(bar.close) - 2.0;
    }
    let changed = run(mutated);

    let entry_prices = |s: &RunSummary| {
        s.fills
            .iter()
            .map(|f| (f.entry_ts, f.entry_price))
            .collect::<Vec<_>>()
    };
    assert_eq!(entry_prices(&baseline), entry_prices(&changed));
}
