//! Parallel execution engine
//!
//! A fixed pool of workers advances through four phases over one shared
//! context. Within a phase, work is handed out by an atomic cursor; between
//! phases, every worker meets at a reusable barrier.
//!
//! ```text
//!                 ┌─────────────────────────────────────────┐
//!                 │              SharedState                │
//!                 │  raw ─▶ freq tables ─▶ clean ─▶ indexes │
//!                 └───────────────────┬─────────────────────┘
//!                                     │ claim_next()
//!       ┌─────────────────────────────┼─────────────────────────────┐
//!       │                             │                             │
//! ┌─────▼─────┐                 ┌─────▼─────┐                 ┌─────▼─────┐
//! │ Worker 0  │                 │ Worker 1  │       ...       │ Worker N  │
//! └─────┬─────┘                 └─────┬─────┘                 └─────┬─────┘
//!       └──────────────────── PhaseBarrier (x4) ────────────────────┘
//! ```

pub mod barrier;
pub mod cursor;
pub mod pool;
pub mod processor;
pub mod source;
pub mod state;

pub use barrier::{AbortOnDrop, BarrierBroken, PhaseBarrier};
pub use cursor::PhaseCursor;
pub use pool::{execute, PoolProgress, RunStats, WorkerPool, MAX_WORKERS};
pub use source::{ArticleSource, JsonFileSource, LoadedFile};
pub use state::{PipelineInputs, SharedState};

use std::fmt;

/// One of the four ordered stages every worker completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Load article files into the raw collection
    Ingest,
    /// Count id and title occurrences
    Count,
    /// Keep records with a unique id and title
    Filter,
    /// Keywords, language index, category index
    Aggregate,
}

impl Phase {
    /// All phases in execution order
    pub const ALL: [Phase; 4] = [Phase::Ingest, Phase::Count, Phase::Filter, Phase::Aggregate];

    pub fn index(self) -> usize {
        match self {
            Phase::Ingest => 0,
            Phase::Count => 1,
            Phase::Filter => 2,
            Phase::Aggregate => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Phase> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Ingest => "ingest",
            Phase::Count => "count",
            Phase::Filter => "filter",
            Phase::Aggregate => "aggregate",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order_round_trips_through_index() {
        for (i, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), i);
            assert_eq!(Phase::from_index(i), Some(*phase));
        }
        assert_eq!(Phase::from_index(4), None);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Aggregate.to_string(), "aggregate");
    }
}
