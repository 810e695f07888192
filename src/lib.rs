//! # Rush Hour Solver Library
//!
//! This library models the Rush Hour sliding-block puzzle and searches its state
//! space for a sequence of moves that lets the primary piece `P` leave the board
//! through the goal opening.
//!
//! It is used by two binaries:
//! - `solve_puzzle`: Reads a puzzle file, solves it with the selected algorithm and
//!   heuristic, and prints (or saves) the step-by-step transcript.
//! - `strategy_benchmark`: Runs every algorithm/heuristic pair over a puzzle and a
//!   set of seeded scrambles of it, and compares path lengths and search effort.
//!
//! ## Modules
//! - `engine`: Pieces, the board grid and the movement rules.
//! - `state`: Immutable search nodes (`State`) and the per-run `StateArena`.
//! - `heuristics`: The `Heuristic` evaluators used to guide informed search.
//! - `search`: Best-first search (UCS, greedy, A*) and IDA*.
//! - `solver`: Algorithm selection, `solve` and background solving with cancellation.
//! - `utils`: Puzzle file parsing, transcripts and seeded scrambles.
//! - `error`: Error types shared by the modules above.

pub mod engine;
pub mod error;
pub mod heuristics;
pub mod search;
pub mod solver;
pub mod state;
pub mod utils;

pub use error::{ConfigError, EngineError, ParseError, SolveError};
pub use solver::{solve, Algorithm, Solution, SolverConfig};
