//! Error types for the constraint-based Game of Life engine

use thiserror::Error;

/// Errors raised while building, posting or solving a round
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifeError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("coordinate ({row}, {col}) out of range for a {length}x{length} board")]
    CoordinateOutOfRange {
        row: usize,
        col: usize,
        length: usize,
    },

    #[error("no solution found at round {round}")]
    NoSolution { round: usize },

    #[error("{generation} cell {index} is still unassigned")]
    Unassigned {
        generation: &'static str,
        index: usize,
    },

    #[error("malformed board input: {0}")]
    MalformedBoard(String),

    #[error("search gave up after exploring {nodes} nodes")]
    SearchLimitExceeded { nodes: u64 },

    #[error("constraint posted on an already failed store")]
    Inconsistent,

    #[error("SAT backend error: {0}")]
    Sat(String),
}

pub type Result<T> = std::result::Result<T, LifeError>;
