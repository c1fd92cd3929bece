//! Engine-level error taxonomy.

/// Errors that abort a replay run.
///
/// Input validation has its own error type upstream; by the time the engine
/// ticks, only internal inconsistencies and strategy failures remain. A
/// failed run produces no artifacts; partial state is discarded by the
/// caller.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// End-of-run reconciliation found internal state disagreeing with the
    /// snapshot log. Always a bug, never a data problem.
    #[error("integrity check failed: {0}")]
    Integrity(String),

    #[error("strategy failed at bar {bar_index}: {source}")]
    Strategy {
        bar_index: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
