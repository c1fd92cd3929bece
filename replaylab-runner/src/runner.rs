//! Backtest orchestration: load, validate, compute features, replay, write
//! artifacts.

use std::path::PathBuf;

use replaylab_core::{
    BarSequence, EngineConfig, EngineError, FeatureError, FeatureProvider, RunSummary,
    TradingEngine, ValidationError, ValidationMode,
};
use thiserror::Error;
use tracing::info;

use crate::artifacts::{write_run_artifacts, RunManifest, SCHEMA_VERSION};
use crate::config::{DataConfig, RunConfig, RunId};
use crate::data_loader::{dataset_hash, CsvFeed, FeedSource, LoadError, SyntheticFeed};
use crate::features::FeaturePipeline;
use crate::metrics::RunMetrics;
use crate::registry::{build_strategy, RegistryError};

/// Anything that can abort a run. Artifacts are only written on the fully
/// successful path, so every variant here implies an empty output directory.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("data loading failed: {0}")]
    Load(#[from] LoadError),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("no bars left after validation")]
    EmptyData,

    #[error("strategy construction failed: {0}")]
    Registry(#[from] RegistryError),

    #[error("feature computation failed: {0}")]
    Features(#[from] FeatureError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("artifact writing failed: {0}")]
    Artifacts(#[source] anyhow::Error),
}

/// A completed run: summary plus everything that was persisted.
#[derive(Debug)]
pub struct BacktestArtifacts {
    pub run_id: RunId,
    pub run_dir: PathBuf,
    pub summary: RunSummary,
    pub metrics: RunMetrics,
    pub manifest: RunManifest,
}

fn make_feed(data: &DataConfig) -> Box<dyn FeedSource> {
    match data {
        DataConfig::Csv { snapshot_dir } => Box::new(CsvFeed::new(snapshot_dir.clone())),
        DataConfig::Synthetic { n_bars, seed } => Box::new(SyntheticFeed::new(*n_bars, *seed)),
    }
}

/// Execute one deterministic backtest and write its artifacts.
pub fn run_backtest(cfg: &RunConfig) -> Result<BacktestArtifacts, RunError> {
    let run_id = cfg.run_id();
    let feed = make_feed(&cfg.data);
    info!(%run_id, symbol = %cfg.symbol, feed = %feed.describe(), "starting run");

    let frame = feed.fetch()?;
    let mode = if cfg.lenient_validation {
        ValidationMode::Lenient
    } else {
        ValidationMode::Strict
    };
    let bars = BarSequence::from_frame(&frame, mode)?;
    if bars.is_empty() {
        return Err(RunError::EmptyData);
    }
    info!(
        n_bars = bars.len(),
        duplicates_dropped = bars.report().duplicates_dropped,
        invalid_dropped = bars.report().invalid_dropped,
        resorted = bars.report().resorted,
        "validated bar sequence"
    );

    let bundle = build_strategy(&cfg.strategy)?;
    let pipeline = FeaturePipeline::new(bundle.indicators);
    let features = pipeline.compute(bars.bars())?;
    info!(features = ?features.names(), warmup = pipeline.max_lookback(), "computed features");

    let engine_cfg = EngineConfig {
        starting_capital: cfg.starting_capital,
        sizing: cfg.sizing,
        end_of_data: cfg.end_of_data,
    };
    let summary = TradingEngine::run(engine_cfg, cfg.risk, bundle.strategy, &bars, &features)?;

    let metrics = RunMetrics::compute(&run_id, &cfg.symbol, &cfg.timeframe, &summary);
    let manifest = RunManifest {
        schema_version: SCHEMA_VERSION,
        run_id: run_id.clone(),
        created_at: chrono::Utc::now(),
        config: cfg.clone(),
        feed: feed.kind(),
        feed_description: feed.describe(),
        dataset_hash: dataset_hash(bars.bars()),
        validation: bars.report().clone(),
        end_of_data: cfg.end_of_data,
    };

    let run_dir = cfg.output_dir.join(&run_id);
    write_run_artifacts(&run_dir, &manifest, &metrics, &summary)
        .map_err(RunError::Artifacts)?;
    info!(
        ending_equity = summary.ending_equity,
        n_trades = metrics.n_trades,
        "run complete"
    );

    Ok(BacktestArtifacts {
        run_id,
        run_dir,
        summary,
        metrics,
        manifest,
    })
}
