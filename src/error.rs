//! Error types for the Rush Hour solver.
//!
//! Construction and configuration problems are errors. A search that exhausts
//! the state space without reaching the goal is not: it returns an empty path.

use crate::engine::{GoalEdge, Orientation};
use crate::solver::Algorithm;
use thiserror::Error;

/// Violations of the board/piece placement rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A piece must cover at least two cells.
    #[error("piece '{id}' has {count} cell(s), at least 2 are required")]
    TooFewCells { id: char, count: usize },

    /// All cells of a piece must lie on one row or one column.
    #[error("cells of piece '{id}' are not on a single row or column")]
    NotCollinear { id: char },

    /// A piece cell lies outside the board.
    #[error("piece '{id}' is out of bounds at ({row}, {col})")]
    OutOfBounds { id: char, row: i32, col: i32 },

    /// Two pieces claim the same cell.
    #[error("pieces '{existing}' and '{incoming}' overlap at ({row}, {col})")]
    Overlap {
        row: usize,
        col: usize,
        existing: char,
        incoming: char,
    },

    /// The piece set has no primary piece.
    #[error("primary piece not found")]
    MissingPrimary,

    /// The primary piece cannot slide towards the goal edge.
    #[error("primary piece is {orientation:?} but the goal is on the {edge:?} edge")]
    MisalignedPrimary {
        orientation: Orientation,
        edge: GoalEdge,
    },

    #[error("board dimensions {rows}x{cols} are invalid")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("goal index {index} on the {edge:?} edge must be below {limit}")]
    GoalOutOfRange {
        edge: GoalEdge,
        index: usize,
        limit: usize,
    },
}

/// Unknown or incomplete algorithm/heuristic selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("unknown heuristic: {0}")]
    UnknownHeuristic(String),

    /// Greedy, A* and IDA* cannot run without a heuristic.
    #[error("algorithm {0} requires a heuristic")]
    MissingHeuristic(Algorithm),
}

/// Failures while reading a puzzle file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read puzzle file: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing header line: {0}")]
    MissingHeader(&'static str),

    #[error("invalid header: expected 'A B', found '{0}'")]
    InvalidHeader(String),

    #[error("{what} must be a positive integer, found '{value}'")]
    InvalidNumber { what: &'static str, value: String },

    #[error("expected {expected} board rows, found {found}")]
    RowCount { expected: usize, found: usize },

    #[error("row {row} has {found} cells, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unrecognized character '{ch}' at row {row}, column {col}")]
    InvalidCell { row: usize, col: usize, ch: char },

    #[error("no goal position ('K') found")]
    MissingGoal,

    #[error("multiple goal positions ('K') found")]
    MultipleGoals,

    #[error("goal ('K') at line {line}, column {col} is not on the border")]
    GoalNotOnBorder { line: usize, col: usize },

    #[error("no primary piece ('P') found")]
    MissingPrimary,

    #[error("header declares {declared} pieces but the board has {found}")]
    PieceCountMismatch { declared: usize, found: usize },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Everything `solve` can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid puzzle: {0}")]
    Engine(#[from] EngineError),

    /// The cancel token was set before the search finished.
    #[error("solve was cancelled")]
    Cancelled,
}
