//! Search-graph nodes.
//!
//! A `State` is an immutable snapshot: a placed `Board`, the piece list it was
//! built from, the path cost `g`, an optional cached heuristic value and the
//! label of the move that produced it. Parents are referenced by `StateId`
//! into a per-run `StateArena`, which owns every state of a search and is
//! dropped as a unit when the search returns.
use crate::engine::{Board, GoalEdge, MoveDirection, Orientation, Piece, Shift, PRIMARY_PIECE_ID};
use crate::error::EngineError;
use crate::heuristics::Heuristic;
use std::ops::Index;

/// Label of the root state.
pub const START_LABEL: &str = "Start";

/// Index of a `State` inside a `StateArena` (or inside a solution path).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(usize);

impl StateId {
    /// The first state pushed into an arena: the root of a search.
    pub const ROOT: StateId = StateId(0);

    pub fn new(index: usize) -> Self {
        StateId(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// A node of the search tree.
#[derive(Clone, Debug)]
pub struct State {
    board: Board,
    pieces: Vec<Piece>,
    parent: Option<StateId>,
    cost: u32,
    heuristic: Option<u32>,
    label: String,
    moved_piece: Option<char>,
}

impl State {
    /// Builds the root state by placing `pieces` on an empty copy of `board`.
    ///
    /// # Errors
    /// * `EngineError::MissingPrimary` if no piece carries the primary identifier.
    /// * `EngineError::MisalignedPrimary` if the primary piece cannot slide towards
    ///   the goal edge. Heuristics and the goal test rely on this alignment.
    /// * Any placement error from `Board::place`.
    pub fn initial(board: &Board, pieces: Vec<Piece>) -> Result<State, EngineError> {
        let primary = pieces
            .iter()
            .find(|p| p.is_primary())
            .ok_or(EngineError::MissingPrimary)?;
        let edge = board.goal().edge;
        if primary.orientation() != edge.axis() {
            return Err(EngineError::MisalignedPrimary {
                orientation: primary.orientation(),
                edge,
            });
        }

        let board = board.place(&pieces)?;
        Ok(State {
            board,
            pieces,
            parent: None,
            cost: 0,
            heuristic: None,
            label: START_LABEL.to_string(),
            moved_piece: None,
        })
    }

    /// Caches the value of `heuristic` for this state, or clears it for `None`.
    pub fn with_heuristic(mut self, heuristic: Option<Heuristic>) -> State {
        self.heuristic = heuristic.map(|h| h.evaluate(&self));
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn parent(&self) -> Option<StateId> {
        self.parent
    }

    /// Path cost `g`: the number of moves from the root.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// The cached heuristic value, if the state was built with one.
    pub fn heuristic(&self) -> Option<u32> {
        self.heuristic
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Identifier of the piece moved to reach this state; `None` for the root.
    pub fn moved_piece(&self) -> Option<char> {
        self.moved_piece
    }

    /// Returns `true` if the move into this state was made by the primary piece.
    pub fn primary_moved(&self) -> bool {
        self.moved_piece == Some(PRIMARY_PIECE_ID)
    }

    /// The primary piece; `None` only after it has slid off the board.
    pub fn primary_piece(&self) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.is_primary())
    }

    pub fn is_goal(&self) -> bool {
        self.primary_piece()
            .is_some_and(|primary| self.board.is_goal_reached(primary))
    }

    /// Generates every state reachable by a single one-cell slide.
    ///
    /// `id` is this state's own arena id and becomes the children's parent.
    /// Children are emitted by piece index, `Shift::Backward` before
    /// `Shift::Forward`; searches break ties by this order. A child whose board
    /// cannot be rebuilt is dropped.
    pub fn successors(&self, id: StateId, heuristic: Option<Heuristic>) -> Vec<State> {
        let mut successors = Vec::new();

        for (i, piece) in self.pieces.iter().enumerate() {
            for shift in Shift::ALL {
                if !piece.can_move(shift, &self.board) {
                    continue;
                }

                let mut pieces = self.pieces.clone();
                pieces[i] = piece.moved(shift);
                let Ok(board) = self.board.place(&pieces) else {
                    continue;
                };

                let label = format!("Move {} {}", piece.id(), piece.orientation().direction(shift));
                successors.push(
                    self.child(id, board, pieces, label, piece.id())
                        .with_heuristic(heuristic),
                );
            }
        }

        successors
    }

    /// Builds the terminal state in which the primary piece has left the board.
    ///
    /// The label reads `"Move P <Direction> <N>x"`, `N` being the primary piece's
    /// length.
    pub fn slide_off(&self, id: StateId) -> Result<State, EngineError> {
        let primary = self.primary_piece().ok_or(EngineError::MissingPrimary)?;
        let direction = exit_direction(primary.orientation(), self.board.goal().edge);
        let label = format!("Move {} {} {}x", primary.id(), direction, primary.len());
        let moved = primary.id();

        let pieces: Vec<Piece> = self
            .pieces
            .iter()
            .filter(|p| !p.is_primary())
            .cloned()
            .collect();
        let board = self.board.place(&pieces)?;

        Ok(self.child(id, board, pieces, label, moved))
    }

    /// A copy of this state pointing at a different parent.
    pub(crate) fn reparented(&self, parent: Option<StateId>) -> State {
        State {
            parent,
            ..self.clone()
        }
    }

    fn child(
        &self,
        id: StateId,
        board: Board,
        pieces: Vec<Piece>,
        label: String,
        moved_piece: char,
    ) -> State {
        State {
            board,
            pieces,
            parent: Some(id),
            cost: self.cost + 1,
            heuristic: None,
            label,
            moved_piece: Some(moved_piece),
        }
    }
}

fn exit_direction(orientation: Orientation, edge: GoalEdge) -> MoveDirection {
    match orientation {
        Orientation::Horizontal if edge == GoalEdge::Right => MoveDirection::Right,
        Orientation::Horizontal => MoveDirection::Left,
        Orientation::Vertical if edge == GoalEdge::Bottom => MoveDirection::Down,
        Orientation::Vertical => MoveDirection::Up,
    }
}

/// Owns every state created during one search run.
#[derive(Debug, Default)]
pub struct StateArena {
    states: Vec<State>,
}

impl StateArena {
    pub fn new() -> Self {
        StateArena { states: Vec::new() }
    }

    /// Stores `state` and returns its id. Ids are handed out in push order.
    pub fn push(&mut self, state: State) -> StateId {
        self.states.push(state);
        StateId(self.states.len() - 1)
    }

    pub fn get(&self, id: StateId) -> &State {
        &self.states[id.0]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl Index<StateId> for StateArena {
    type Output = State;

    fn index(&self, id: StateId) -> &State {
        self.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Goal;
    use crate::utils::{pieces_from_rows, state_from_rows};

    #[test]
    fn test_initial_requires_primary_piece() {
        let board = Board::new(2, 3, Goal::new(GoalEdge::Right, 0)).unwrap();
        let pieces = pieces_from_rows(&["AA.", "..."]).unwrap();
        assert_eq!(
            State::initial(&board, pieces).unwrap_err(),
            EngineError::MissingPrimary
        );
    }

    #[test]
    fn test_initial_rejects_misaligned_primary() {
        let result = state_from_rows(&["P..", "P..", "..."], Goal::new(GoalEdge::Right, 0));
        assert_eq!(
            result.unwrap_err(),
            EngineError::MisalignedPrimary {
                orientation: Orientation::Vertical,
                edge: GoalEdge::Right
            }
        );
    }

    #[test]
    fn test_initial_state_fields() {
        let state = state_from_rows(&["AA..", "PP.."], Goal::new(GoalEdge::Right, 1)).unwrap();
        assert_eq!(state.cost(), 0);
        assert_eq!(state.parent(), None);
        assert_eq!(state.label(), START_LABEL);
        assert_eq!(state.moved_piece(), None);
        assert_eq!(state.heuristic(), None);
        assert!(!state.is_goal());
        assert_eq!(state.board().to_string(), "AA..\nPP..");

        let state = state.with_heuristic(Some(Heuristic::Distance));
        assert_eq!(state.heuristic(), Some(3));
    }

    #[test]
    fn test_successor_order_and_labels() {
        let state = state_from_rows(
            &["....", "A...", "A.B.", "PPB.", "...."],
            Goal::new(GoalEdge::Right, 3),
        )
        .unwrap();
        let children = state.successors(StateId::ROOT, None);
        let labels: Vec<&str> = children.iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["Move A Up", "Move B Up", "Move B Down"]);

        for child in &children {
            assert_eq!(child.cost(), 1);
            assert_eq!(child.parent(), Some(StateId::ROOT));
            assert_eq!(child.heuristic(), None);
            assert_eq!(child.board(), &state.board().place(child.pieces()).unwrap());
        }
        assert_eq!(children[1].board().to_string(), "....\nA.B.\nA.B.\nPP..\n....");
        assert_eq!(children[2].moved_piece(), Some('B'));
    }

    #[test]
    fn test_successors_cache_heuristic() {
        let state = state_from_rows(&["....", "PP.A", "...A"], Goal::new(GoalEdge::Right, 1)).unwrap();
        let children = state.successors(StateId::new(7), Some(Heuristic::Combined));
        let labels: Vec<&str> = children.iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["Move P Right", "Move A Up"]);
        // P moved right: distance 2, A still blocks.
        assert_eq!(children[0].heuristic(), Some(3));
        assert!(children[0].primary_moved());
        // A moved up to rows 0-1: still blocking.
        assert_eq!(children[1].heuristic(), Some(4));
        assert_eq!(children[1].parent(), Some(StateId::new(7)));
    }

    #[test]
    fn test_slide_off_removes_primary() {
        let state = state_from_rows(&["....", "..PP", "AA.."], Goal::new(GoalEdge::Right, 1)).unwrap();
        assert!(state.is_goal());

        let exited = state.slide_off(StateId::ROOT).unwrap();
        assert_eq!(exited.label(), "Move P Right 2x");
        assert_eq!(exited.board().to_string(), "....\n....\nAA..");
        assert_eq!(exited.pieces().len(), 1);
        assert_eq!(exited.cost(), 1);
        assert_eq!(exited.parent(), Some(StateId::ROOT));
        assert!(exited.primary_piece().is_none());
        assert!(!exited.is_goal());
        assert!(exited.slide_off(StateId::new(1)).is_err());
    }

    #[test]
    fn test_slide_off_direction_follows_goal_edge() {
        let top = state_from_rows(&[".P.", ".P.", ".P."], Goal::new(GoalEdge::Top, 1)).unwrap();
        assert_eq!(top.slide_off(StateId::ROOT).unwrap().label(), "Move P Up 3x");

        let left = state_from_rows(&["PP.", "..."], Goal::new(GoalEdge::Left, 0)).unwrap();
        assert_eq!(left.slide_off(StateId::ROOT).unwrap().label(), "Move P Left 2x");

        let bottom = state_from_rows(&["...", "P..", "P.."], Goal::new(GoalEdge::Bottom, 0)).unwrap();
        assert_eq!(bottom.slide_off(StateId::ROOT).unwrap().label(), "Move P Down 2x");
    }

    #[test]
    fn test_arena_hands_out_sequential_ids() {
        let state = state_from_rows(&["PP."], Goal::new(GoalEdge::Right, 0)).unwrap();
        let mut arena = StateArena::new();
        assert!(arena.is_empty());
        let root = arena.push(state.clone());
        assert_eq!(root, StateId::ROOT);
        let child = state.successors(root, None).remove(0);
        let child_id = arena.push(child);
        assert_eq!(child_id.index(), 1);
        assert_eq!(arena[child_id].parent(), Some(root));
        assert_eq!(arena.len(), 2);
    }
}
