//! Frame-level integrity checks for raw bar input.

use chrono::{DateTime, Utc};
use polars::prelude::*;

use crate::domain::Bar;

/// Columns every raw bar frame must carry. `real_volume` is optional.
pub const REQUIRED_COLUMNS: [&str; 7] =
    ["time", "open", "high", "low", "close", "tick_volume", "spread"];

/// Errors raised while turning a raw frame into a validated sequence.
///
/// Missing columns and null timestamps are always fatal; OHLC and spread
/// violations are fatal in strict mode only.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("null timestamps found: {} rows (first at {:?})", rows.len(), rows.first())]
    NullTimestamps { rows: Vec<usize> },

    #[error("unsupported time column type: {0} (expected Datetime or Int64 epoch-ns)")]
    TimestampType(String),

    #[error("timestamp at row {row} is outside the nanosecond-representable range: {value}")]
    TimestampOutOfRange { row: usize, value: DateTime<Utc> },

    #[error("OHLC invariant violated: {} rows (indices {rows:?})", rows.len())]
    BadOhlc { rows: Vec<usize> },

    #[error("negative spread: {} rows (indices {rows:?})", rows.len())]
    NegativeSpread { rows: Vec<usize> },

    #[error(transparent)]
    Frame(#[from] PolarsError),
}

/// One raw row, still carrying its input index for error reporting.
pub(crate) struct RawRow {
    pub ts_ns: i64,
    pub input_index: usize,
    pub bar: Bar,
}

/// Extract raw rows from a frame, normalizing timestamps to epoch
/// nanoseconds. Fails on missing columns or null timestamps; per-bar OHLC
/// and spread checks are left to the caller so lenient mode can drop rows.
pub(crate) fn frame_to_rows(df: &DataFrame) -> Result<Vec<RawRow>, ValidationError> {
    let schema = df.schema();
    for name in REQUIRED_COLUMNS {
        if !schema.contains(name) {
            return Err(ValidationError::MissingColumn(name.to_string()));
        }
    }

    let time_col = df.column("time")?;
    let ns_factor: i64 = match time_col.dtype() {
        DataType::Datetime(TimeUnit::Nanoseconds, _) => 1,
        DataType::Datetime(TimeUnit::Microseconds, _) => 1_000,
        DataType::Datetime(TimeUnit::Milliseconds, _) => 1_000_000,
        DataType::Int64 => 1,
        other => return Err(ValidationError::TimestampType(format!("{other:?}"))),
    };
    let time_i64 = time_col.cast(&DataType::Int64)?;
    let time = time_i64.i64()?;

    let null_rows: Vec<usize> = (0..time.len()).filter(|&i| time.get(i).is_none()).collect();
    if !null_rows.is_empty() {
        return Err(ValidationError::NullTimestamps { rows: null_rows });
    }

    let open = f64_column(df, "open")?;
    let high = f64_column(df, "high")?;
    let low = f64_column(df, "low")?;
    let close = f64_column(df, "close")?;
    let tick_volume = f64_column(df, "tick_volume")?;
    let spread = f64_column(df, "spread")?;
    let real_volume = if schema.contains("real_volume") {
        Some(f64_column(df, "real_volume")?)
    } else {
        None
    };

    let mut rows = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let ts_ns = match time.get(i) {
            Some(v) => v * ns_factor,
            None => continue, // unreachable: null rows rejected above
        };
        let bar = Bar {
            timestamp: DateTime::from_timestamp_nanos(ts_ns),
            open: open[i].unwrap_or(f64::NAN),
            high: high[i].unwrap_or(f64::NAN),
            low: low[i].unwrap_or(f64::NAN),
            close: close[i].unwrap_or(f64::NAN),
            tick_volume: tick_volume[i].unwrap_or(0.0) as u64,
            spread: spread[i].unwrap_or(f64::NAN),
            real_volume: real_volume
                .as_ref()
                .and_then(|col| col[i])
                .map(|v| v as u64),
        };
        rows.push(RawRow {
            ts_ns,
            input_index: i,
            bar,
        });
    }

    Ok(rows)
}

fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, ValidationError> {
    let casted = df.column(name)?.cast(&DataType::Float64)?;
    let ca = casted.f64()?;
    Ok((0..ca.len()).map(|i| ca.get(i)).collect())
}
