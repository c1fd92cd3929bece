//! Serializable run configuration, loaded from TOML.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use replaylab_core::{EndOfDataPolicy, RiskConfig, SizingConfig};
use serde::{Deserialize, Serialize};

/// Content-addressable identifier for a run: two identical configs share a
/// RunId and therefore reproduce the same artifacts.
pub type RunId = String;

/// Everything needed to reproduce one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub symbol: String,
    pub timeframe: String,
    pub starting_capital: f64,

    pub data: DataConfig,
    pub strategy: StrategyConfig,

    #[serde(default)]
    pub sizing: SizingConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub end_of_data: EndOfDataPolicy,
    /// Drop insane bars instead of failing the run.
    #[serde(default)]
    pub lenient_validation: bool,

    pub output_dir: PathBuf,
}

impl RunConfig {
    /// Load and parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let cfg: RunConfig = toml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(cfg)
    }

    /// Deterministic hash ID for this configuration (BLAKE3 over canonical
    /// JSON).
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

/// Where the raw bars come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum DataConfig {
    /// Concatenate every `*.csv` in the snapshot directory, in filename
    /// order.
    Csv { snapshot_dir: PathBuf },
    /// Seeded random-walk bars; for development and determinism checks.
    Synthetic { n_bars: usize, seed: u64 },
}

/// Which moving average feeds the crossover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaKind {
    #[default]
    Sma,
    Ema,
}

/// Strategy selection plus parameters, serializable for the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    MaCrossover {
        fast_period: usize,
        slow_period: usize,
        #[serde(default)]
        indicator: MaKind,
    },
    AdxFilteredCrossover {
        fast_period: usize,
        slow_period: usize,
        #[serde(default)]
        indicator: MaKind,
        #[serde(default = "default_adx_period")]
        adx_period: usize,
        #[serde(default = "default_adx_threshold")]
        adx_threshold: f64,
    },
}

fn default_adx_period() -> usize {
    14
}

fn default_adx_threshold() -> f64 {
    25.0
}
