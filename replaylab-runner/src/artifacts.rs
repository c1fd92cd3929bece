//! Run artifact generation: equity curve, trade tape, metrics, manifest.
//!
//! Artifacts are written only after a run completes and reconciles; a failed
//! run leaves no run directory behind. Every JSON artifact carries a
//! `schema_version` so loaders can reject formats they do not understand.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use replaylab_core::{EndOfDataPolicy, EquitySnapshot, Fill, RunSummary, ValidationReport};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::RunConfig;
use crate::data_loader::FeedKind;
use crate::metrics::RunMetrics;

pub const SCHEMA_VERSION: u32 = 1;

/// Reproducibility record for one run: the full config plus the provenance
/// and fingerprint of the data it actually consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u32,
    pub run_id: String,
    pub created_at: DateTime<Utc>,
    pub config: RunConfig,
    pub feed: FeedKind,
    pub feed_description: String,
    pub dataset_hash: String,
    pub validation: ValidationReport,
    pub end_of_data: EndOfDataPolicy,
}

/// Render the equity curve as CSV, one row per bar.
pub fn equity_csv(snapshots: &[EquitySnapshot]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "timestamp",
        "equity",
        "position",
        "realized_pnl",
        "unrealized_pnl",
        "drawdown",
    ])?;
    for s in snapshots {
        wtr.write_record([
            s.timestamp.to_rfc3339(),
            format!("{:.6}", s.equity),
            format!("{:.6}", s.position),
            format!("{:.6}", s.realized_pnl),
            format!("{:.6}", s.unrealized_pnl),
            format!("{:.9}", s.drawdown),
        ])?;
    }
    let bytes = wtr.into_inner().context("failed to flush equity CSV")?;
    String::from_utf8(bytes).context("equity CSV is not valid UTF-8")
}

/// Render the trade tape as CSV. Open fills serialize with empty exit
/// fields.
pub fn trades_csv(fills: &[Fill]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "entry_ts",
        "exit_ts",
        "side",
        "qty",
        "entry_price",
        "exit_price",
        "pnl",
    ])?;
    for f in fills {
        wtr.write_record([
            f.entry_ts.to_rfc3339(),
            f.exit_ts.map(|ts| ts.to_rfc3339()).unwrap_or_default(),
            format!("{:?}", f.side).to_lowercase(),
            format!("{:.6}", f.qty),
            format!("{:.6}", f.entry_price),
            f.exit_price.map(|p| format!("{p:.6}")).unwrap_or_default(),
            format!("{:.6}", f.pnl),
        ])?;
    }
    let bytes = wtr.into_inner().context("failed to flush trades CSV")?;
    String::from_utf8(bytes).context("trades CSV is not valid UTF-8")
}

/// Persist all artifacts for a completed run under
/// `<output_dir>/<run_id>/`.
pub fn write_run_artifacts(
    run_dir: &Path,
    manifest: &RunManifest,
    metrics: &RunMetrics,
    summary: &RunSummary,
) -> Result<()> {
    fs::create_dir_all(run_dir)
        .with_context(|| format!("failed to create run dir {}", run_dir.display()))?;

    let write = |name: &str, contents: String| -> Result<()> {
        let path = run_dir.join(name);
        fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))
    };

    write("equity.csv", equity_csv(&summary.snapshots)?)?;
    write("trades.csv", trades_csv(&summary.fills)?)?;
    write(
        "metrics.json",
        serde_json::to_string_pretty(metrics).context("failed to serialize metrics")?,
    )?;
    write(
        "manifest.json",
        serde_json::to_string_pretty(manifest).context("failed to serialize manifest")?,
    )?;

    info!(dir = %run_dir.display(), "wrote run artifacts");
    Ok(())
}

/// Load a manifest back, rejecting unknown schema versions.
pub fn read_manifest(path: &Path) -> Result<RunManifest> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let manifest: RunManifest =
        serde_json::from_str(&text).context("failed to deserialize manifest")?;
    anyhow::ensure!(
        manifest.schema_version <= SCHEMA_VERSION,
        "unsupported schema version {} (max supported: {})",
        manifest.schema_version,
        SCHEMA_VERSION
    );
    Ok(manifest)
}
