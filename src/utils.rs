//! Puzzle input and output helpers.
//!
//! - `parse_puzzle` / `read_puzzle_file`: the text format of puzzle files.
//! - `pieces_from_rows` / `state_from_rows`: build pieces and states from plain
//!   grid rows, mostly for tests.
//! - `format_transcript` / `write_transcript`: human-readable solution output.
//! - `scramble`: seeded random walks producing new reachable puzzles.
use crate::engine::{Board, Goal, GoalEdge, Piece, EMPTY_CELL, PRIMARY_PIECE_ID};
use crate::error::{EngineError, ParseError};
use crate::solver::Solution;
use crate::state::{State, StateId};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::io;
use std::path::Path;

/// Marks the exit in puzzle files.
pub const GOAL_MARKER: char = 'K';

/// A validated puzzle: an empty board (extents and goal) plus the pieces to place on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Puzzle {
    board: Board,
    pieces: Vec<Piece>,
}

impl Puzzle {
    /// Checks that `pieces` form a valid start position on `board`.
    pub fn new(board: Board, pieces: Vec<Piece>) -> Result<Self, EngineError> {
        State::initial(&board, pieces.clone())?;
        Ok(Puzzle { board, pieces })
    }

    /// The empty board template.
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Builds the root search state.
    pub fn initial_state(&self) -> Result<State, EngineError> {
        State::initial(&self.board, self.pieces.clone())
    }
}

/// Collects pieces from grid rows.
///
/// `EMPTY_CELL` marks an empty cell; any other character is a piece identifier.
/// Pieces are returned in the order their first cell is met scanning row by row,
/// and each piece lists its cells in that same order.
///
/// # Examples
/// ```
/// use rush_hour_solver::utils::pieces_from_rows;
/// let pieces = pieces_from_rows(&["AA.", "..B", "PPB"]).unwrap();
/// let ids: Vec<char> = pieces.iter().map(|p| p.id()).collect();
/// assert_eq!(ids, vec!['A', 'B', 'P']);
/// assert_eq!(pieces[1].cells(), &[(1, 2), (2, 2)]);
/// ```
pub fn pieces_from_rows(rows: &[&str]) -> Result<Vec<Piece>, EngineError> {
    let mut cells_by_id: Vec<(char, Vec<(i32, i32)>)> = Vec::new();

    for (r, row) in rows.iter().enumerate() {
        for (c, ch) in row.chars().enumerate() {
            if ch == EMPTY_CELL {
                continue;
            }
            let cell = (r as i32, c as i32);
            match cells_by_id.iter_mut().find(|(id, _)| *id == ch) {
                Some((_, cells)) => cells.push(cell),
                None => cells_by_id.push((ch, vec![cell])),
            }
        }
    }

    cells_by_id
        .into_iter()
        .map(|(id, cells)| Piece::new(id, cells))
        .collect()
}

/// Builds a root state from grid rows; the board takes the size of the rows.
pub fn state_from_rows(rows: &[&str], goal: Goal) -> Result<State, EngineError> {
    let cols = rows.first().map_or(0, |row| row.chars().count());
    let board = Board::new(rows.len(), cols, goal)?;
    State::initial(&board, pieces_from_rows(rows)?)
}

/// Reads and parses a puzzle file.
pub fn read_puzzle_file(path: &Path) -> Result<Puzzle, ParseError> {
    let content = fs::read_to_string(path)?;
    parse_puzzle(&content)
}

/// Parses the puzzle text format.
///
/// ```text
/// A B        rows and columns
/// N          number of pieces besides the primary piece
/// <grid>     A rows of B cells, with the exit 'K' just outside one border
/// ```
///
/// The `K` may sit on its own line above the grid (TOP) or below it (BOTTOM), or
/// as an extra first (LEFT) or last (RIGHT) character of a row. With a LEFT exit
/// the other rows may carry one leading pad character.
///
/// # Examples
/// ```
/// use rush_hour_solver::engine::GoalEdge;
/// use rush_hour_solver::utils::parse_puzzle;
/// let puzzle = parse_puzzle("2 3\n1\nAA.\nPP.K\n").unwrap();
/// assert_eq!(puzzle.board().goal().edge, GoalEdge::Right);
/// assert_eq!(puzzle.board().goal().index, 1);
/// assert_eq!(puzzle.pieces().len(), 2);
/// ```
pub fn parse_puzzle(content: &str) -> Result<Puzzle, ParseError> {
    let mut lines = content.lines();

    let header = lines.next().ok_or(ParseError::MissingHeader("dimensions"))?;
    let dims: Vec<&str> = header.split_whitespace().collect();
    if dims.len() != 2 {
        return Err(ParseError::InvalidHeader(header.trim().to_string()));
    }
    let rows = parse_number(dims[0], "row count", false)?;
    let cols = parse_number(dims[1], "column count", false)?;

    let count_line = lines.next().ok_or(ParseError::MissingHeader("piece count"))?;
    let declared = parse_number(count_line.trim(), "piece count", true)?;

    let raw: Vec<&str> = lines
        .map(|line| line.trim_end())
        .filter(|line| !line.is_empty())
        .collect();

    let (goal, grid) = locate_goal(&raw, rows, cols)?;

    for (r, row) in grid.iter().enumerate() {
        let found = row.chars().count();
        if found != cols {
            return Err(ParseError::RowLength {
                row: r,
                expected: cols,
                found,
            });
        }
        if let Some((c, ch)) = row
            .chars()
            .enumerate()
            .find(|&(_, ch)| ch != EMPTY_CELL && !ch.is_ascii_alphanumeric())
        {
            return Err(ParseError::InvalidCell { row: r, col: c, ch });
        }
    }

    let pieces = pieces_from_rows(&grid)?;
    if !pieces.iter().any(|p| p.id() == PRIMARY_PIECE_ID) {
        return Err(ParseError::MissingPrimary);
    }
    let found = pieces.len() - 1;
    if found != declared {
        return Err(ParseError::PieceCountMismatch { declared, found });
    }

    let board = Board::new(rows, cols, goal)?;
    Ok(Puzzle::new(board, pieces)?)
}

fn parse_number(value: &str, what: &'static str, allow_zero: bool) -> Result<usize, ParseError> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 || allow_zero => Ok(n),
        _ => Err(ParseError::InvalidNumber {
            what,
            value: value.to_string(),
        }),
    }
}

// Finds the single 'K' and returns the goal together with the bare grid rows.
fn locate_goal<'a>(
    raw: &[&'a str],
    rows: usize,
    cols: usize,
) -> Result<(Goal, Vec<&'a str>), ParseError> {
    let mut markers = raw.iter().enumerate().flat_map(|(line, text)| {
        text.chars()
            .enumerate()
            .filter(|&(_, ch)| ch == GOAL_MARKER)
            .map(move |(col, _)| (line, col))
    });
    let (line, col) = markers.next().ok_or(ParseError::MissingGoal)?;
    if markers.next().is_some() {
        return Err(ParseError::MultipleGoals);
    }
    let not_on_border = ParseError::GoalNotOnBorder { line, col };

    if raw.len() == rows + 1 {
        if col >= cols {
            return Err(not_on_border);
        }
        if line == 0 {
            return Ok((Goal::new(GoalEdge::Top, col), raw[1..].to_vec()));
        }
        if line == rows {
            return Ok((Goal::new(GoalEdge::Bottom, col), raw[..rows].to_vec()));
        }
        return Err(not_on_border);
    }

    if raw.len() != rows {
        return Err(ParseError::RowCount {
            expected: rows,
            found: raw.len(),
        });
    }

    if col == 0 && raw[line].chars().count() == cols + 1 {
        // Every row is shifted by the exit column; strip the pad character.
        let grid = raw
            .iter()
            .map(|&text| {
                if text.chars().count() == cols + 1 {
                    text.char_indices().nth(1).map_or("", |(i, _)| &text[i..])
                } else {
                    text
                }
            })
            .collect();
        return Ok((Goal::new(GoalEdge::Left, line), grid));
    }

    if col == cols {
        let grid = raw
            .iter()
            .map(|&text| match text.char_indices().nth(cols) {
                Some((i, GOAL_MARKER)) => &text[..i],
                _ => text,
            })
            .collect();
        return Ok((Goal::new(GoalEdge::Right, line), grid));
    }

    Err(not_on_border)
}

/// Renders a solution as a step-by-step transcript.
pub fn format_transcript(solution: &Solution) -> String {
    let mut output = String::new();

    let Some(initial) = solution.path.first() else {
        output.push_str("No solution found\n");
        output.push_str(&format!("Nodes explored: {}\n", solution.nodes_explored));
        return output;
    };

    output.push_str(&format!("Initial board\n{}\n", initial.board()));
    for (step, state) in solution.path.iter().enumerate().skip(1) {
        output.push_str(&format!("\nStep {}: {}\n{}\n", step, state.label(), state.board()));
    }
    output.push_str(&format!("\nSteps: {}\n", solution.steps()));
    output.push_str(&format!("Nodes explored: {}\n", solution.nodes_explored));
    output
}

/// Writes `format_transcript(solution)` to `path`.
pub fn write_transcript(path: &Path, solution: &Solution) -> io::Result<()> {
    fs::write(path, format_transcript(solution))
}

/// Walks `moves` random legal moves away from `puzzle`'s start position.
///
/// The walk is reproducible: the same puzzle, move count and seed always give
/// the same result. It stops early if a position has no legal move.
pub fn scramble(puzzle: &Puzzle, moves: usize, seed: u64) -> Result<Puzzle, EngineError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut state = puzzle.initial_state()?;

    for _ in 0..moves {
        let mut successors = state.successors(StateId::ROOT, None);
        if successors.is_empty() {
            break;
        }
        let pick = rng.gen_range(0..successors.len());
        state = successors.swap_remove(pick);
    }

    Puzzle::new(puzzle.board().clone(), state.pieces().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{solve, Algorithm, SolverConfig};

    const CLASSIC: &str = "6 6\n11\nAAB..F\n..BCDF\nGPPCDFK\nGH.III\nGHJ...\nLLJMM.\n";

    #[test]
    fn test_parse_right_goal() {
        let puzzle = parse_puzzle(CLASSIC).unwrap();
        assert_eq!(puzzle.board().rows(), 6);
        assert_eq!(puzzle.board().cols(), 6);
        assert_eq!(puzzle.board().goal(), Goal::new(GoalEdge::Right, 2));
        assert_eq!(puzzle.pieces().len(), 12);
        let primary = puzzle.pieces().iter().find(|p| p.is_primary()).unwrap();
        assert_eq!(primary.cells(), &[(2, 1), (2, 2)]);
        let state = puzzle.initial_state().unwrap();
        assert_eq!(state.board().get_cell(2, 5), Some('F'));
    }

    #[test]
    fn test_parse_top_and_bottom_goals() {
        let top = parse_puzzle("3 3\n1\n K\n.P.\n.P.\nAA.\n").unwrap();
        assert_eq!(top.board().goal(), Goal::new(GoalEdge::Top, 1));

        let bottom = parse_puzzle("3 3\n1\nAA.\n..P\n..P\n  K\n").unwrap();
        assert_eq!(bottom.board().goal(), Goal::new(GoalEdge::Bottom, 2));
        assert!(bottom.initial_state().unwrap().is_goal());
    }

    #[test]
    fn test_parse_left_goal_strips_padding() {
        let puzzle = parse_puzzle("3 4\n1\n AA..\nK.PP.\n ....\n").unwrap();
        assert_eq!(puzzle.board().goal(), Goal::new(GoalEdge::Left, 1));
        let state = puzzle.initial_state().unwrap();
        assert_eq!(state.board().to_string(), "AA..\n.PP.\n....");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_puzzle(""), Err(ParseError::MissingHeader(_))));
        assert!(matches!(parse_puzzle("6\n1\n"), Err(ParseError::InvalidHeader(_))));
        assert!(matches!(
            parse_puzzle("0 3\n1\n"),
            Err(ParseError::InvalidNumber { what: "row count", .. })
        ));
        assert!(matches!(
            parse_puzzle("2 3\n1\nAA.\nPP.\n"),
            Err(ParseError::MissingGoal)
        ));
        assert!(matches!(
            parse_puzzle("2 3\n1\nAA.K\nPP.K\n"),
            Err(ParseError::MultipleGoals)
        ));
        assert!(matches!(
            parse_puzzle("2 3\n1\nAK.\nPP.\n"),
            Err(ParseError::GoalNotOnBorder { line: 0, col: 1 })
        ));
        assert!(matches!(
            parse_puzzle("3 3\n1\nAA.\nPP.K\n"),
            Err(ParseError::RowCount { expected: 3, found: 2 })
        ));
        assert!(matches!(
            parse_puzzle("2 3\n1\nAA\nPP.K\n"),
            Err(ParseError::RowLength { row: 0, expected: 3, found: 2 })
        ));
        assert!(matches!(
            parse_puzzle("2 3\n1\nAA#\nPP.K\n"),
            Err(ParseError::InvalidCell { row: 0, col: 2, ch: '#' })
        ));
        assert!(matches!(
            parse_puzzle("2 3\n1\nAA.\nBB.K\n"),
            Err(ParseError::MissingPrimary)
        ));
        assert!(matches!(
            parse_puzzle("2 3\n2\nAA.\nPP.K\n"),
            Err(ParseError::PieceCountMismatch { declared: 2, found: 1 })
        ));
        assert!(matches!(
            parse_puzzle("2 3\n1\nA..\nPPAK\n"),
            Err(ParseError::Engine(EngineError::NotCollinear { id: 'A' }))
        ));
    }

    #[test]
    fn test_transcript_lists_every_step() {
        let puzzle = parse_puzzle("4 4\n1\n...A\nPP.AK\n....\n....\n").unwrap();
        let config = SolverConfig::new(Algorithm::Ucs, None).unwrap();
        let solution = solve(puzzle.initial_state().unwrap(), &config).unwrap();
        let transcript = format_transcript(&solution);
        assert!(transcript.starts_with("Initial board\n...A\nPP.A\n....\n....\n"));
        assert!(transcript.contains("Move P Right 2x\n"));
        assert!(transcript.contains("Step 1: "));
        assert!(transcript.contains(&format!("Steps: {}", solution.steps())));
        assert!(transcript.contains(&format!("Nodes explored: {}", solution.nodes_explored)));
    }

    #[test]
    fn test_transcript_for_unsolved_puzzle() {
        let solution = Solution {
            path: Vec::new(),
            nodes_explored: 4,
        };
        assert_eq!(
            format_transcript(&solution),
            "No solution found\nNodes explored: 4\n"
        );
    }

    #[test]
    fn test_write_transcript_to_file() {
        let solution = Solution {
            path: Vec::new(),
            nodes_explored: 0,
        };
        let path = std::env::temp_dir().join(format!("rush_hour_transcript_{}.txt", std::process::id()));
        write_transcript(&path, &solution).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert!(written.starts_with("No solution found"));
    }

    #[test]
    fn test_scramble_is_deterministic_and_valid() {
        let puzzle = parse_puzzle(CLASSIC).unwrap();
        let first = scramble(&puzzle, 40, 7).unwrap();
        let second = scramble(&puzzle, 40, 7).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.pieces().len(), puzzle.pieces().len());
        assert!(first.initial_state().is_ok());
        assert_eq!(scramble(&puzzle, 0, 7).unwrap(), puzzle);
    }
}
