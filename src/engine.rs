//! Board and piece model for the Rush Hour puzzle.
//!
//! This module defines the fundamental components of a puzzle position:
//! - `Piece`: a straight run of cells with a fixed orientation. Pieces are values;
//!   moving one produces a new `Piece`.
//! - `Board`: fixed extents, a goal on one edge, and a grid derived from placing
//!   the full piece set. A placement that overlaps or leaves the board fails.
//! - `Shift` / `MoveDirection`: a one-cell step along a piece's own axis and its
//!   human-readable name.
//!
//! Coordinates are `(row, col)` pairs of `i32`, so a shifted piece can be
//! represented (and rejected) even when it falls off the board.
use crate::error::EngineError;
use std::fmt;

/// Identifier of the piece that has to leave the board through the goal.
pub const PRIMARY_PIECE_ID: char = 'P';

/// Character used for empty cells in text renderings and canonical keys.
pub const EMPTY_CELL: char = '.';

/// A `(row, col)` board coordinate.
pub type Cell = (i32, i32);

/// The axis a piece slides along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// All cells share a row; the piece moves left and right.
    Horizontal,
    /// All cells share a column; the piece moves up and down.
    Vertical,
}

impl Orientation {
    /// Names the direction a `shift` takes a piece with this orientation.
    ///
    /// # Examples
    /// ```
    /// use rush_hour_solver::engine::{MoveDirection, Orientation, Shift};
    /// assert_eq!(Orientation::Horizontal.direction(Shift::Backward), MoveDirection::Left);
    /// assert_eq!(Orientation::Vertical.direction(Shift::Forward), MoveDirection::Down);
    /// ```
    pub fn direction(&self, shift: Shift) -> MoveDirection {
        match (self, shift) {
            (Orientation::Horizontal, Shift::Backward) => MoveDirection::Left,
            (Orientation::Horizontal, Shift::Forward) => MoveDirection::Right,
            (Orientation::Vertical, Shift::Backward) => MoveDirection::Up,
            (Orientation::Vertical, Shift::Forward) => MoveDirection::Down,
        }
    }
}

/// The board edge that holds the exit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GoalEdge {
    Top,
    Left,
    Right,
    Bottom,
}

impl GoalEdge {
    /// The orientation a piece needs to slide through this edge.
    pub fn axis(&self) -> Orientation {
        match self {
            GoalEdge::Left | GoalEdge::Right => Orientation::Horizontal,
            GoalEdge::Top | GoalEdge::Bottom => Orientation::Vertical,
        }
    }
}

/// Location of the exit: an edge and the row (LEFT/RIGHT) or column (TOP/BOTTOM) on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Goal {
    pub edge: GoalEdge,
    pub index: usize,
}

impl Goal {
    pub fn new(edge: GoalEdge, index: usize) -> Self {
        Goal { edge, index }
    }
}

/// A single-cell step along a piece's own axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shift {
    /// Towards row/column 0 (up or left).
    Backward,
    /// Away from row/column 0 (down or right).
    Forward,
}

impl Shift {
    /// Both shifts, in the order successors are generated.
    pub const ALL: [Shift; 2] = [Shift::Backward, Shift::Forward];

    /// The signed coordinate delta of this shift: `-1` or `+1`.
    pub fn offset(&self) -> i32 {
        match self {
            Shift::Backward => -1,
            Shift::Forward => 1,
        }
    }
}

/// Human-readable direction of a move, as used in move labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Up,
    Down,
    Left,
    Right,
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MoveDirection::Up => "Up",
            MoveDirection::Down => "Down",
            MoveDirection::Left => "Left",
            MoveDirection::Right => "Right",
        };
        write!(f, "{}", s)
    }
}

/// A linear piece: an identifier and the ordered list of cells it covers.
///
/// The cell order is preserved across moves, so the first cell always refers to
/// the same end of the piece. Heuristics scan from that first cell.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    id: char,
    cells: Vec<Cell>,
    orientation: Orientation,
}

impl Piece {
    /// Creates a piece from its identifier and cells.
    ///
    /// The orientation is derived: `Horizontal` iff every cell shares a row,
    /// otherwise `Vertical`, in which case every cell must share a column.
    ///
    /// # Errors
    /// * `EngineError::TooFewCells` if fewer than two cells are given.
    /// * `EngineError::NotCollinear` if the cells share neither a row nor a column.
    ///
    /// # Examples
    /// ```
    /// use rush_hour_solver::engine::{Orientation, Piece};
    /// let car = Piece::new('A', vec![(2, 3), (2, 4)]).unwrap();
    /// assert_eq!(car.orientation(), Orientation::Horizontal);
    /// assert!(Piece::new('B', vec![(0, 0)]).is_err());
    /// assert!(Piece::new('C', vec![(0, 0), (1, 1)]).is_err());
    /// ```
    pub fn new(id: char, cells: Vec<Cell>) -> Result<Self, EngineError> {
        if cells.len() < 2 {
            return Err(EngineError::TooFewCells {
                id,
                count: cells.len(),
            });
        }

        let (first_row, first_col) = cells[0];
        let orientation = if cells.iter().all(|&(r, _)| r == first_row) {
            Orientation::Horizontal
        } else if cells.iter().all(|&(_, c)| c == first_col) {
            Orientation::Vertical
        } else {
            return Err(EngineError::NotCollinear { id });
        };

        Ok(Piece {
            id,
            cells,
            orientation,
        })
    }

    pub fn id(&self) -> char {
        self.id
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Number of cells covered by the piece; at least two.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_primary(&self) -> bool {
        self.id == PRIMARY_PIECE_ID
    }

    /// The first listed cell of the piece.
    pub fn lead_cell(&self) -> Cell {
        self.cells[0]
    }

    /// Returns `true` if this piece covers `(row, col)`.
    pub fn occupies(&self, row: i32, col: i32) -> bool {
        self.cells.iter().any(|&cell| cell == (row, col))
    }

    /// Checks whether the piece can slide one cell in the direction of `shift`.
    ///
    /// Every shifted cell must be on the board, and must either already belong to
    /// this piece or be empty in `board`.
    pub fn can_move(&self, shift: Shift, board: &Board) -> bool {
        self.cells.iter().all(|&cell| {
            let (row, col) = self.shift_cell(cell, shift);
            if !board.in_bounds(row, col) {
                return false;
            }
            // In bounds, so the casts are lossless.
            self.occupies(row, col) || board.get_cell(row as usize, col as usize).is_none()
        })
    }

    /// Returns a copy of this piece with every cell shifted one step.
    ///
    /// The move is unconditional; check `can_move` first.
    pub fn moved(&self, shift: Shift) -> Piece {
        Piece {
            id: self.id,
            cells: self
                .cells
                .iter()
                .map(|&cell| self.shift_cell(cell, shift))
                .collect(),
            orientation: self.orientation,
        }
    }

    fn shift_cell(&self, (row, col): Cell, shift: Shift) -> Cell {
        match self.orientation {
            Orientation::Horizontal => (row, col + shift.offset()),
            Orientation::Vertical => (row + shift.offset(), col),
        }
    }
}

/// A rectangular board snapshot derived from placing a set of pieces.
///
/// Two boards compare equal exactly when their extents, goal and occupied cells
/// match. Within one search every board shares extents and goal, so the
/// `canonical_key` alone identifies a search-graph node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    rows: usize,
    cols: usize,
    goal: Goal,
    grid: Vec<Option<char>>,
}

impl Board {
    /// Creates an empty board.
    ///
    /// # Errors
    /// * `EngineError::InvalidDimensions` if either extent is zero or does not fit an `i32`.
    /// * `EngineError::GoalOutOfRange` if the goal index is past the end of its edge.
    pub fn new(rows: usize, cols: usize, goal: Goal) -> Result<Self, EngineError> {
        if rows == 0 || cols == 0 || i32::try_from(rows.max(cols)).is_err() {
            return Err(EngineError::InvalidDimensions { rows, cols });
        }

        let limit = match goal.edge {
            GoalEdge::Left | GoalEdge::Right => rows,
            GoalEdge::Top | GoalEdge::Bottom => cols,
        };
        if goal.index >= limit {
            return Err(EngineError::GoalOutOfRange {
                edge: goal.edge,
                index: goal.index,
                limit,
            });
        }

        Ok(Board {
            rows,
            cols,
            goal,
            grid: vec![None; rows * cols],
        })
    }

    /// Builds a fresh board with the same extents and goal, holding exactly `pieces`.
    ///
    /// Pieces are placed in slice order and the first out-of-bounds or overlapping
    /// cell aborts the placement. `self` is never modified.
    ///
    /// # Errors
    /// * `EngineError::OutOfBounds` for a cell outside the board.
    /// * `EngineError::Overlap` for a cell already claimed by an earlier piece.
    pub fn place(&self, pieces: &[Piece]) -> Result<Board, EngineError> {
        let mut grid = vec![None; self.rows * self.cols];

        for piece in pieces {
            for &(row, col) in piece.cells() {
                if !self.in_bounds(row, col) {
                    return Err(EngineError::OutOfBounds {
                        id: piece.id(),
                        row,
                        col,
                    });
                }
                let (row, col) = (row as usize, col as usize);
                let slot = &mut grid[row * self.cols + col];
                if let Some(existing) = *slot {
                    return Err(EngineError::Overlap {
                        row,
                        col,
                        existing,
                        incoming: piece.id(),
                    });
                }
                *slot = Some(piece.id());
            }
        }

        Ok(Board {
            rows: self.rows,
            cols: self.cols,
            goal: self.goal,
            grid,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn goal(&self) -> Goal {
        self.goal
    }

    /// Returns `true` if `(row, col)` lies on the board.
    pub fn in_bounds(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols
    }

    /// Returns the piece identifier at `(row, col)`, or `None` for an empty cell.
    ///
    /// # Panics
    /// Panics if `row` or `col` is outside the board.
    pub fn get_cell(&self, row: usize, col: usize) -> Option<char> {
        assert!(row < self.rows && col < self.cols, "cell ({row}, {col}) is off the board");
        self.grid[row * self.cols + col]
    }

    /// Checks whether `primary` touches the exit.
    ///
    /// The goal is reached when any cell of the piece sits in the goal row
    /// (LEFT/RIGHT) or column (TOP/BOTTOM) on the outermost line of the goal edge.
    pub fn is_goal_reached(&self, primary: &Piece) -> bool {
        let index = self.goal.index as i32;
        let last_row = self.rows as i32 - 1;
        let last_col = self.cols as i32 - 1;

        primary.cells().iter().any(|&(row, col)| match self.goal.edge {
            GoalEdge::Left => col == 0 && row == index,
            GoalEdge::Right => col == last_col && row == index,
            GoalEdge::Top => row == 0 && col == index,
            GoalEdge::Bottom => row == last_row && col == index,
        })
    }

    /// Returns a copy of the grid as rows of cells.
    pub fn snapshot(&self) -> Vec<Vec<Option<char>>> {
        self.grid.chunks(self.cols).map(|row| row.to_vec()).collect()
    }

    /// The row-major string of cell characters, `EMPTY_CELL` for empty cells.
    ///
    /// Used as the visited-set key by the searches.
    pub fn canonical_key(&self) -> String {
        self.grid.iter().map(|cell| cell.unwrap_or(EMPTY_CELL)).collect()
    }

    /// Generates a coloured rendering of the board for terminal output.
    ///
    /// Every piece gets an ANSI background colour (the primary piece is always red).
    /// If `highlight` names a piece, its cells are marked with `*`.
    pub fn to_string_with_highlight(&self, highlight: Option<char>) -> String {
        let mut output = String::new();

        output.push_str("   ");
        for c_idx in 0..self.cols {
            output.push_str(&format!("{:<2}", c_idx));
        }

        for (r_idx, row) in self.grid.chunks(self.cols).enumerate() {
            output.push('\n');
            output.push_str(&format!("{:<3}", r_idx));
            for cell in row {
                let content = match cell {
                    Some(id) if Some(*id) == highlight => format!("{}*", id),
                    Some(id) => format!("{} ", id),
                    None => format!("{} ", EMPTY_CELL),
                };
                output.push_str(&format!("\x1b[1;{}m{}\x1b[m", ansi_color_code(*cell), content));
            }
        }

        output
    }
}

impl fmt::Display for Board {
    /// Plain rendering: one line per row, `EMPTY_CELL` for empty cells.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r_idx, row) in self.grid.chunks(self.cols).enumerate() {
            if r_idx > 0 {
                writeln!(f)?;
            }
            for cell in row {
                write!(f, "{}", cell.unwrap_or(EMPTY_CELL))?;
            }
        }
        Ok(())
    }
}

// Background colours for pieces; red (41) is reserved for the primary piece.
const PIECE_COLORS: [&str; 5] = ["42", "43", "44", "45", "46"];

fn ansi_color_code(cell: Option<char>) -> &'static str {
    match cell {
        None => "40",
        Some(PRIMARY_PIECE_ID) => "41",
        Some(id) => PIECE_COLORS[id as usize % PIECE_COLORS.len()],
    }
}
