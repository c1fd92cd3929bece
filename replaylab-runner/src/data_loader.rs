//! Raw bar acquisition: CSV snapshots and synthetic feeds.
//!
//! A feed only assembles the raw frame; validation, repair, and ordering all
//! happen in the core's replay layer. Synthetic data is a development mode
//! and is tagged in the manifest.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no CSV files found in {0}")]
    NoCsvFiles(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path}: missing column `{column}`")]
    MissingColumn { path: PathBuf, column: String },

    #[error("{path} row {row}: unparseable timestamp `{value}`")]
    BadTimestamp {
        path: PathBuf,
        row: usize,
        value: String,
    },

    #[error("{path} row {row}: unparseable number in `{column}`: `{value}`")]
    BadNumber {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    #[error(transparent)]
    Frame(#[from] PolarsError),
}

/// Provenance of a run's bars, recorded in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    Csv,
    Synthetic,
}

/// Source of raw bar frames. The runner depends on this trait only, so new
/// providers plug in without touching the replay path.
pub trait FeedSource {
    fn kind(&self) -> FeedKind;
    fn describe(&self) -> String;
    fn fetch(&self) -> Result<DataFrame, LoadError>;
}

/// Concatenates every `*.csv` under a snapshot directory, in filename order.
///
/// Columns: `time` plus OHLC are required; `volume` is accepted as an alias
/// for `tick_volume`; a missing `spread` column is filled with zeros;
/// `real_volume` is carried through when present. Timestamps may be epoch
/// seconds, RFC 3339, or `%Y-%m-%d %H:%M:%S` (read as UTC).
pub struct CsvFeed {
    snapshot_dir: PathBuf,
}

impl CsvFeed {
    pub fn new(snapshot_dir: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_dir: snapshot_dir.into(),
        }
    }

    fn csv_paths(&self) -> Result<Vec<PathBuf>, LoadError> {
        let entries = std::fs::read_dir(&self.snapshot_dir).map_err(|source| LoadError::Io {
            path: self.snapshot_dir.clone(),
            source,
        })?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
            .collect();
        paths.sort();
        if paths.is_empty() {
            return Err(LoadError::NoCsvFiles(self.snapshot_dir.clone()));
        }
        Ok(paths)
    }
}

struct RawColumns {
    time_ns: Vec<i64>,
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
    tick_volume: Vec<i64>,
    spread: Vec<f64>,
    real_volume: Vec<Option<i64>>,
    has_real_volume: bool,
}

impl RawColumns {
    fn new() -> Self {
        Self {
            time_ns: Vec::new(),
            open: Vec::new(),
            high: Vec::new(),
            low: Vec::new(),
            close: Vec::new(),
            tick_volume: Vec::new(),
            spread: Vec::new(),
            real_volume: Vec::new(),
            has_real_volume: false,
        }
    }

    fn into_frame(self) -> Result<DataFrame, LoadError> {
        let mut columns = vec![
            Column::new("time".into(), self.time_ns),
            Column::new("open".into(), self.open),
            Column::new("high".into(), self.high),
            Column::new("low".into(), self.low),
            Column::new("close".into(), self.close),
            Column::new("tick_volume".into(), self.tick_volume),
            Column::new("spread".into(), self.spread),
        ];
        if self.has_real_volume {
            columns.push(Column::new("real_volume".into(), self.real_volume));
        }
        Ok(DataFrame::new(columns)?)
    }
}

impl FeedSource for CsvFeed {
    fn kind(&self) -> FeedKind {
        FeedKind::Csv
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.snapshot_dir.display())
    }

    fn fetch(&self) -> Result<DataFrame, LoadError> {
        let mut cols = RawColumns::new();

        for path in self.csv_paths()? {
            let mut reader =
                csv::Reader::from_path(&path).map_err(|source| LoadError::Csv {
                    path: path.clone(),
                    source,
                })?;
            let headers = reader
                .headers()
                .map_err(|source| LoadError::Csv {
                    path: path.clone(),
                    source,
                })?
                .clone();
            let col = |name: &str| headers.iter().position(|h| h == name);

            let time_idx = col("time").ok_or_else(|| LoadError::MissingColumn {
                path: path.clone(),
                column: "time".to_string(),
            })?;
            let require = |name: &str| {
                col(name).ok_or_else(|| LoadError::MissingColumn {
                    path: path.clone(),
                    column: name.to_string(),
                })
            };
            let open_idx = require("open")?;
            let high_idx = require("high")?;
            let low_idx = require("low")?;
            let close_idx = require("close")?;
            // MT5 exports name it tick_volume; generic exports say volume.
            let volume_idx = col("tick_volume")
                .or_else(|| col("volume"))
                .ok_or_else(|| LoadError::MissingColumn {
                    path: path.clone(),
                    column: "tick_volume".to_string(),
                })?;
            let spread_idx = col("spread");
            let real_volume_idx = col("real_volume");
            if real_volume_idx.is_some() {
                cols.has_real_volume = true;
            }

            let mut rows = 0usize;
            for (row, record) in reader.records().enumerate() {
                let record = record.map_err(|source| LoadError::Csv {
                    path: path.clone(),
                    source,
                })?;
                let field = |idx: usize| record.get(idx).unwrap_or("").trim();

                cols.time_ns.push(parse_timestamp(field(time_idx)).ok_or_else(|| {
                    LoadError::BadTimestamp {
                        path: path.clone(),
                        row,
                        value: field(time_idx).to_string(),
                    }
                })?);
                let num = |name: &str, idx: usize| -> Result<f64, LoadError> {
                    field(idx).parse::<f64>().map_err(|_| LoadError::BadNumber {
                        path: path.clone(),
                        row,
                        column: name.to_string(),
                        value: field(idx).to_string(),
                    })
                };
                cols.open.push(num("open", open_idx)?);
                cols.high.push(num("high", high_idx)?);
                cols.low.push(num("low", low_idx)?);
                cols.close.push(num("close", close_idx)?);
                cols.tick_volume.push(num("tick_volume", volume_idx)? as i64);
                cols.spread.push(match spread_idx {
                    Some(idx) => num("spread", idx)?,
                    None => 0.0,
                });
                cols.real_volume.push(match real_volume_idx {
                    Some(idx) => Some(num("real_volume", idx)? as i64),
                    None => None,
                });
                rows += 1;
            }
            info!(file = %path.display(), rows, "loaded snapshot");
        }

        cols.into_frame()
    }
}

/// Epoch seconds, RFC 3339, or naive `%Y-%m-%d %H:%M:%S` (UTC), to epoch ns.
///
/// Integer values are epoch seconds only; millisecond or nanosecond epochs
/// overflow the conversion and are rejected rather than misread.
fn parse_timestamp(value: &str) -> Option<i64> {
    if let Ok(secs) = value.parse::<i64>() {
        return secs.checked_mul(1_000_000_000);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.with_timezone(&Utc).timestamp_nanos_opt();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Utc.from_utc_datetime(&naive).timestamp_nanos_opt();
    }
    None
}

/// Seeded hourly random-walk bars starting 2024-01-01 00:00 UTC.
pub struct SyntheticFeed {
    n_bars: usize,
    seed: u64,
}

impl SyntheticFeed {
    pub fn new(n_bars: usize, seed: u64) -> Self {
        Self { n_bars, seed }
    }
}

impl FeedSource for SyntheticFeed {
    fn kind(&self) -> FeedKind {
        FeedKind::Synthetic
    }

    fn describe(&self) -> String {
        format!("synthetic:n={},seed={}", self.n_bars, self.seed)
    }

    fn fetch(&self) -> Result<DataFrame, LoadError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let t0 = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        let mut price = 100.0f64;

        let mut cols = RawColumns::new();
        for i in 0..self.n_bars {
            let drift: f64 = rng.gen_range(-1.0..1.0);
            let open = price;
            let close = (price + drift).max(1.0);
            let high = open.max(close) + rng.gen_range(0.0..0.5);
            let low = (open.min(close) - rng.gen_range(0.0..0.5)).max(0.5);
            price = close;

            let ts = t0 + chrono::Duration::hours(i as i64);
            cols.time_ns.push(ts.timestamp_nanos_opt().unwrap_or(0));
            cols.open.push(open);
            cols.high.push(high);
            cols.low.push(low);
            cols.close.push(close);
            cols.tick_volume.push(rng.gen_range(100..10_000));
            cols.spread.push(rng.gen_range(0.0..0.3));
            cols.real_volume.push(None);
        }
        cols.into_frame()
    }
}

/// Deterministic BLAKE3 fingerprint over the validated bar data, recorded in
/// the manifest so two runs can prove they saw the same input.
pub fn dataset_hash(bars: &[replaylab_core::Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(
            &bar.timestamp
                .timestamp_nanos_opt()
                .unwrap_or(0)
                .to_le_bytes(),
        );
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.tick_volume.to_le_bytes());
        hasher.update(&bar.spread.to_le_bytes());
        if let Some(rv) = bar.real_volume {
            hasher.update(&rv.to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}
