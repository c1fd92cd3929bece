//! Runner: everything around the core replay engine that touches the
//! outside world. Data feeds, indicator pipelines, strategy registry,
//! metrics, artifact writing, and parameter sweeps.

pub mod artifacts;
pub mod config;
pub mod data_loader;
pub mod features;
pub mod metrics;
pub mod registry;
pub mod runner;
pub mod strategies;
pub mod sweep;

pub use artifacts::{RunManifest, SCHEMA_VERSION};
pub use config::{DataConfig, MaKind, RunConfig, RunId, StrategyConfig};
pub use data_loader::{CsvFeed, FeedKind, FeedSource, LoadError, SyntheticFeed};
pub use features::{FeaturePipeline, Indicator};
pub use metrics::RunMetrics;
pub use registry::{build_strategy, StrategyBundle};
pub use runner::{run_backtest, BacktestArtifacts, RunError};
pub use sweep::{run_many, ParamGrid};
