use crate::engine::{GoalEdge, Piece};
use crate::error::ConfigError;
use crate::state::State;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// The closed set of heuristic evaluators.
///
/// Every evaluator looks only at the primary piece's first listed cell and the
/// straight line from it to the goal edge. A state without a primary piece
/// (the final slide-off state) evaluates to 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Heuristic {
    /// Cells between the primary piece's lead cell and the goal edge.
    Distance,
    /// Distinct pieces between the primary piece and the goal edge.
    BlockerCount,
    /// `Distance + BlockerCount`.
    Combined,
}

impl Heuristic {
    pub const ALL: [Heuristic; 3] = [
        Heuristic::Distance,
        Heuristic::BlockerCount,
        Heuristic::Combined,
    ];

    /// Evaluates the heuristic for `state`.
    pub fn evaluate(&self, state: &State) -> u32 {
        match self {
            Heuristic::Distance => distance_to_goal(state),
            Heuristic::BlockerCount => count_blockers(state),
            Heuristic::Combined => combined_estimate(state),
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Heuristic::Distance => "Distance",
            Heuristic::BlockerCount => "Blocker Count",
            Heuristic::Combined => "Combined",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Heuristic {
    type Err = ConfigError;

    /// Accepts the display names and the upper-case selector names, ignoring case,
    /// spaces, dashes and underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_uppercase();
        match normalized.as_str() {
            "DISTANCE" => Ok(Heuristic::Distance),
            "BLOCKERCOUNT" | "BLOCKER" | "BLOCKERS" => Ok(Heuristic::BlockerCount),
            "COMBINED" | "STANDARD" => Ok(Heuristic::Combined),
            _ => Err(ConfigError::UnknownHeuristic(s.to_string())),
        }
    }
}

/// Number of cells from the primary piece's lead cell to the goal edge.
///
/// For a RIGHT goal this is `cols - 1 - col`, for LEFT it is `col`, and likewise
/// with rows for BOTTOM and TOP.
pub fn distance_to_goal(state: &State) -> u32 {
    let Some(primary) = state.primary_piece() else {
        return 0;
    };
    let board = state.board();
    let (row, col) = primary.lead_cell();

    let distance = match board.goal().edge {
        GoalEdge::Right => board.cols() as i32 - 1 - col,
        GoalEdge::Left => col,
        GoalEdge::Bottom => board.rows() as i32 - 1 - row,
        GoalEdge::Top => row,
    };
    distance.max(0) as u32
}

/// Number of distinct other pieces on the straight line from the primary piece's
/// lead cell to the goal edge.
pub fn count_blockers(state: &State) -> u32 {
    let Some(primary) = state.primary_piece() else {
        return 0;
    };
    let board = state.board();
    let mut blockers = HashSet::new();

    for (row, col) in cells_towards_goal(primary, board.goal().edge, board.rows(), board.cols()) {
        if let Some(id) = board.get_cell(row, col) {
            if id != primary.id() {
                blockers.insert(id);
            }
        }
    }

    blockers.len() as u32
}

/// The sum of `distance_to_goal` and `count_blockers`.
pub fn combined_estimate(state: &State) -> u32 {
    distance_to_goal(state) + count_blockers(state)
}

// Cells strictly beyond the lead cell, walking outward to the goal edge.
fn cells_towards_goal(
    primary: &Piece,
    edge: GoalEdge,
    rows: usize,
    cols: usize,
) -> Vec<(usize, usize)> {
    let (row, col) = primary.lead_cell();
    let (row, col) = (row as usize, col as usize);
    match edge {
        GoalEdge::Right => (col + 1..cols).map(|c| (row, c)).collect(),
        GoalEdge::Left => (0..col).rev().map(|c| (row, c)).collect(),
        GoalEdge::Bottom => (row + 1..rows).map(|r| (r, col)).collect(),
        GoalEdge::Top => (0..row).rev().map(|r| (r, col)).collect(),
    }
}
