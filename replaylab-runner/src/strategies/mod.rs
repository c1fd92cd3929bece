//! Built-in strategies. Each one is a pure function of its per-bar context;
//! new strategies plug in through the core `Strategy` trait plus the
//! registry.

pub mod adx_filtered;
pub mod ma_crossover;

pub use adx_filtered::AdxFilteredCrossover;
pub use ma_crossover::MaCrossover;
