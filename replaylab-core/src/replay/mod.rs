//! Validated bar replay input.
//!
//! `BarSequence::from_frame` is the single entry point from raw frames into
//! the engine: it checks the schema, normalizes timestamps to epoch
//! nanoseconds, repairs ordering and duplicates, and enforces per-bar sanity
//! according to the chosen [`ValidationMode`].

pub mod validate;

use polars::prelude::DataFrame;
use tracing::warn;

use crate::domain::Bar;
pub use validate::{ValidationError, REQUIRED_COLUMNS};

/// How to treat per-bar sanity violations (OHLC ordering, spread sign).
///
/// Structural problems (missing columns, null timestamps) are fatal in both
/// modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Any invalid bar fails the whole sequence.
    #[default]
    Strict,
    /// Invalid bars are dropped and counted in the report.
    Lenient,
}

/// What validation observed and repaired. Recorded in run artifacts so a
/// replay over dirty data is auditable.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct ValidationReport {
    /// Rows in the input frame before any repair.
    pub rows_in: usize,
    /// True if the input was not already sorted by timestamp.
    pub resorted: bool,
    /// Duplicate-timestamp rows dropped (first occurrence kept).
    pub duplicates_dropped: usize,
    /// Insane bars dropped (lenient mode only).
    pub invalid_dropped: usize,
}

/// An immutable, strictly-increasing sequence of validated bars.
///
/// Construction is the only way to obtain one, so downstream code can assume
/// sorted unique timestamps and sane OHLC without re-checking.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSequence {
    bars: Vec<Bar>,
    report: ValidationReport,
}

impl BarSequence {
    /// Validate a raw frame into a replayable sequence.
    ///
    /// Repairs (counted, never fatal): stable re-sort by timestamp, then
    /// duplicate timestamps dropped keeping the first occurrence in input
    /// order. Sanity violations are fatal in [`ValidationMode::Strict`] and
    /// dropped in [`ValidationMode::Lenient`].
    pub fn from_frame(df: &DataFrame, mode: ValidationMode) -> Result<Self, ValidationError> {
        let rows = validate::frame_to_rows(df)?;
        Self::from_rows(rows, mode)
    }

    /// Validate an in-memory bar vector. Same repair and sanity rules as
    /// [`BarSequence::from_frame`]; used by synthetic feeds. Timestamps that
    /// cannot be expressed as epoch nanoseconds are rejected.
    pub fn from_bars(bars: Vec<Bar>, mode: ValidationMode) -> Result<Self, ValidationError> {
        let mut rows = Vec::with_capacity(bars.len());
        for (i, bar) in bars.into_iter().enumerate() {
            let ts_ns = bar.timestamp.timestamp_nanos_opt().ok_or(
                ValidationError::TimestampOutOfRange {
                    row: i,
                    value: bar.timestamp,
                },
            )?;
            rows.push(validate::RawRow {
                ts_ns,
                input_index: i,
                bar,
            });
        }
        Self::from_rows(rows, mode)
    }

    fn from_rows(
        mut rows: Vec<validate::RawRow>,
        mode: ValidationMode,
    ) -> Result<Self, ValidationError> {
        let rows_in = rows.len();

        let resorted = !rows.windows(2).all(|w| w[0].ts_ns <= w[1].ts_ns);
        if resorted {
            // Stable: equal timestamps keep input order, so keep-first
            // dedup below is well-defined.
            rows.sort_by_key(|r| r.ts_ns);
        }

        let before = rows.len();
        rows.dedup_by_key(|r| r.ts_ns);
        let duplicates_dropped = before - rows.len();

        let mut bad_ohlc = Vec::new();
        let mut bad_spread = Vec::new();
        for row in &rows {
            if row.bar.has_nan() || !row.bar.is_sane() {
                bad_ohlc.push(row.input_index);
            } else if !(row.bar.spread >= 0.0) {
                bad_spread.push(row.input_index);
            }
        }

        let invalid_dropped = match mode {
            ValidationMode::Strict => {
                if !bad_ohlc.is_empty() {
                    return Err(ValidationError::BadOhlc { rows: bad_ohlc });
                }
                if !bad_spread.is_empty() {
                    return Err(ValidationError::NegativeSpread { rows: bad_spread });
                }
                0
            }
            ValidationMode::Lenient => {
                let dropped = bad_ohlc.len() + bad_spread.len();
                if dropped > 0 {
                    warn!(
                        bad_ohlc = bad_ohlc.len(),
                        bad_spread = bad_spread.len(),
                        "dropping insane bars"
                    );
                    rows.retain(|r| {
                        !r.bar.has_nan() && r.bar.is_sane() && r.bar.spread >= 0.0
                    });
                }
                dropped
            }
        };

        Ok(Self {
            bars: rows.into_iter().map(|r| r.bar).collect(),
            report: ValidationReport {
                rows_in,
                resorted,
                duplicates_dropped,
                invalid_dropped,
            },
        })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bar> {
        self.bars.iter()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn report(&self) -> &ValidationReport {
        &self.report
    }
}
