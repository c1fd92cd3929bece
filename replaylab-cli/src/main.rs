//! replaylab CLI — deterministic bar-replay backtests.
//!
//! Commands:
//! - `run` — execute one backtest from a TOML config file
//! - `sweep` — run a crossover period grid from a base config, in parallel

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use replaylab_runner::{run_backtest, run_many, ParamGrid, RunConfig};

#[derive(Parser)]
#[command(
    name = "replaylab",
    about = "replaylab — deterministic bar-replay backtesting engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,
    },
    /// Run a crossover parameter grid derived from a base config.
    Sweep {
        /// Path to the base TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Fast periods to test.
        #[arg(long, value_delimiter = ',', default_values_t = [10usize, 20, 30])]
        fast: Vec<usize>,

        /// Slow periods to test.
        #[arg(long, value_delimiter = ',', default_values_t = [50usize, 100, 200])]
        slow: Vec<usize>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { config } => {
            let cfg = RunConfig::load(&config)?;
            let result = run_backtest(&cfg).context("backtest failed")?;
            println!("run {} complete", result.run_id);
            println!("  bars          : {}", result.metrics.n_bars);
            println!("  trades        : {}", result.metrics.n_trades);
            println!("  ending equity : {:.2}", result.metrics.ending_equity);
            println!("  max drawdown  : {:.2}%", result.metrics.risk.max_drawdown * 100.0);
            println!("  artifacts     : {}", result.run_dir.display());
            Ok(())
        }
        Commands::Sweep { config, fast, slow } => {
            let base = RunConfig::load(&config)?;
            let grid = ParamGrid {
                fast_periods: fast,
                slow_periods: slow,
            };
            let configs = grid.generate_configs(&base);
            anyhow::ensure!(!configs.is_empty(), "parameter grid is empty");
            println!("sweeping {} configurations", configs.len());

            let mut failures = 0usize;
            for (run_id, outcome) in run_many(&configs) {
                match outcome {
                    Ok(result) => println!(
                        "  {run_id}  equity {:.2}  trades {}",
                        result.metrics.ending_equity, result.metrics.n_trades
                    ),
                    Err(err) => {
                        failures += 1;
                        eprintln!("  {run_id}  FAILED: {err}");
                    }
                }
            }
            anyhow::ensure!(failures == 0, "{failures} sweep run(s) failed");
            Ok(())
        }
    }
}
