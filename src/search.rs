//! State-space search over Rush Hour positions.
//!
//! Two strategies are provided:
//! - `standard_search`: best-first graph search over a priority frontier. The
//!   `FrontierOrder` picks uniform-cost, greedy best-first or A* behaviour.
//! - `ida_star_search`: iterative-deepening A*, run with an explicit stack so deep
//!   solutions do not exhaust the call stack.
//!
//! Both identify graph nodes by `Board::canonical_key`, finish a found path with
//! the primary piece's slide-off state and return an empty path when the state
//! space is exhausted.
use crate::error::SolveError;
use crate::heuristics::Heuristic;
use crate::solver::{CancelToken, Solution};
use crate::state::{State, StateArena, StateId};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use tracing::{debug, trace};

/// Priority used to order the frontier of `standard_search`. Lower pops first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrontierOrder {
    /// Path cost `g` only (uniform-cost search).
    Cost,
    /// Heuristic `h` only (greedy best-first search).
    Estimate,
    /// `g + h` (A*).
    CostPlusEstimate,
}

impl FrontierOrder {
    fn key(&self, state: &State) -> u32 {
        let h = state.heuristic().unwrap_or(0);
        match self {
            FrontierOrder::Cost => state.cost(),
            FrontierOrder::Estimate => h,
            FrontierOrder::CostPlusEstimate => state.cost() + h,
        }
    }
}

// Ordering: lowest key first, then states reached by moving the primary piece,
// then insertion order.
#[derive(Debug, PartialEq, Eq)]
struct FrontierEntry {
    key: u32,
    primary_moved: bool,
    seq: u64,
    id: StateId,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap pops the greatest entry.
        other
            .key
            .cmp(&self.key)
            .then_with(|| self.primary_moved.cmp(&other.primary_moved))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Runs a best-first graph search from `initial`.
///
/// Every state pushed is scored with `heuristic` (if any) and ordered by `order`.
/// A popped state whose board was already expanded is discarded. The node count
/// grows by one per pop, plus the primary piece's length when the goal is popped.
///
/// # Errors
/// `SolveError::Cancelled` once `cancel` is set.
pub fn standard_search(
    initial: State,
    order: FrontierOrder,
    heuristic: Option<Heuristic>,
    cancel: &CancelToken,
) -> Result<Solution, SolveError> {
    standard_search_observed(initial, order, heuristic, cancel, |_| {})
}

// `on_expand` sees every state that passes the duplicate check.
pub(crate) fn standard_search_observed<F>(
    initial: State,
    order: FrontierOrder,
    heuristic: Option<Heuristic>,
    cancel: &CancelToken,
    mut on_expand: F,
) -> Result<Solution, SolveError>
where
    F: FnMut(&State),
{
    let mut arena = StateArena::new();
    let mut frontier = BinaryHeap::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut nodes_explored: u64 = 0;
    let mut seq: u64 = 0;

    let root = initial.with_heuristic(heuristic);
    frontier.push(FrontierEntry {
        key: order.key(&root),
        primary_moved: false,
        seq,
        id: arena.push(root),
    });

    while let Some(entry) = frontier.pop() {
        if cancel.is_cancelled() {
            debug!(event = "search_cancelled", nodes_explored);
            return Err(SolveError::Cancelled);
        }
        nodes_explored += 1;

        let current = &arena[entry.id];
        if !visited.insert(current.board().canonical_key()) {
            continue;
        }
        on_expand(current);

        if current.is_goal() {
            nodes_explored += current.primary_piece().map_or(0, |p| p.len()) as u64;
            let exit = current.slide_off(entry.id)?;
            let exit_id = arena.push(exit);
            return Ok(Solution {
                path: reconstruct_path(&arena, exit_id),
                nodes_explored,
            });
        }

        for child in current.successors(entry.id, heuristic) {
            if visited.contains(&child.board().canonical_key()) {
                continue;
            }
            seq += 1;
            frontier.push(FrontierEntry {
                key: order.key(&child),
                primary_moved: child.primary_moved(),
                seq,
                id: arena.push(child),
            });
        }
        trace!(frontier = frontier.len(), visited = visited.len(), "expanded");
    }

    Ok(Solution {
        path: Vec::new(),
        nodes_explored,
    })
}

/// Runs iterative-deepening A* from `initial`.
///
/// The first threshold is `h(root)`. Each iteration is a depth-first pass with a
/// fresh map from board to the lowest `g` expanded in that pass; a state is
/// pruned when `g + h` exceeds the threshold or its board was already reached
/// at an equal or lower `g`. The next threshold is the smallest `g + h` among
/// the cut-off states whose board was not expanded at an equal or lower `g` in
/// the same pass. When no such state remains, every reachable board has been
/// expanded and the puzzle has no solution.
///
/// Only the current path and its unvisited siblings are held as `State`s; the
/// per-pass maps keep one entry per board.
///
/// # Errors
/// `SolveError::Cancelled` once `cancel` is set.
pub fn ida_star_search(
    initial: State,
    heuristic: Heuristic,
    cancel: &CancelToken,
) -> Result<Solution, SolveError> {
    let root = initial.with_heuristic(Some(heuristic));
    let mut threshold = root.heuristic().unwrap_or(0);
    let mut nodes_explored: u64 = 0;

    loop {
        debug!(event = "ida_iteration", threshold, nodes_explored);
        match bounded_search(&root, threshold, heuristic, cancel, &mut nodes_explored)? {
            Bounded::Found(path) => return Ok(Solution { path, nodes_explored }),
            Bounded::Exceeded(next) => threshold = next,
            Bounded::Exhausted => {
                return Ok(Solution {
                    path: Vec::new(),
                    nodes_explored,
                })
            }
        }
    }
}

enum Bounded {
    Found(Vec<State>),
    /// No goal within the threshold; carries the next threshold.
    Exceeded(u32),
    /// No goal and every cut-off board was expanded more cheaply.
    Exhausted,
}

// One level of the depth-first descent: a state on the current path and the
// children not yet visited. Children are dropped with the frame.
struct Frame {
    state: State,
    children: std::vec::IntoIter<State>,
}

fn bounded_search(
    root: &State,
    threshold: u32,
    heuristic: Heuristic,
    cancel: &CancelToken,
    nodes_explored: &mut u64,
) -> Result<Bounded, SolveError> {
    let mut best_cost: HashMap<String, u32> = HashMap::new();
    // Board -> (g, f) of its cheapest cut-off in this pass.
    let mut cut_offs: HashMap<String, (u32, u32)> = HashMap::new();
    // The frames on the stack are the current path from the root, so a state's
    // depth is its index in the returned path.
    let mut stack: Vec<Frame> = Vec::new();
    let mut pending = Some(root.clone());

    loop {
        if let Some(state) = pending.take() {
            if cancel.is_cancelled() {
                debug!(event = "search_cancelled", nodes_explored = *nodes_explored);
                return Err(SolveError::Cancelled);
            }
            *nodes_explored += 1;

            let g = state.cost();
            let f = g + state.heuristic().unwrap_or(0);
            let key = state.board().canonical_key();
            if f > threshold {
                let cut = cut_offs.entry(key).or_insert((g, f));
                if g < cut.0 {
                    *cut = (g, f);
                }
                continue;
            }

            if best_cost.get(&key).is_some_and(|&best| best <= g) {
                continue;
            }
            best_cost.insert(key, g);

            let id = StateId::new(stack.len());
            if state.is_goal() {
                *nodes_explored += state.primary_piece().map_or(0, |p| p.len()) as u64;
                let exit = state.slide_off(id)?;
                let mut path: Vec<State> = stack.into_iter().map(|frame| frame.state).collect();
                path.push(state);
                path.push(exit);
                return Ok(Bounded::Found(path));
            }

            let children = state.successors(id, Some(heuristic)).into_iter();
            stack.push(Frame { state, children });
            continue;
        }

        let Some(frame) = stack.last_mut() else {
            break;
        };
        match frame.children.next() {
            Some(child) => pending = Some(child),
            None => {
                stack.pop();
            }
        }
    }

    // A cut-off is dominated once its board was expanded at an equal or lower g.
    let next = cut_offs
        .iter()
        .filter(|(key, cut)| best_cost.get(key.as_str()).map_or(true, |&best| cut.0 < best))
        .map(|(_, cut)| cut.1)
        .min();
    trace!(
        cut_offs = cut_offs.len(),
        expanded = best_cost.len(),
        "iteration finished"
    );

    Ok(match next {
        Some(next) => Bounded::Exceeded(next),
        None => Bounded::Exhausted,
    })
}

/// Follows parent links from `goal` back to the root and returns the path in
/// root-to-goal order.
///
/// The returned states are detached from `arena`: each one's parent is the
/// `StateId` of its predecessor within the returned path.
pub fn reconstruct_path(arena: &StateArena, goal: StateId) -> Vec<State> {
    let mut ids = Vec::new();
    let mut current = Some(goal);
    while let Some(id) = current {
        ids.push(id);
        current = arena[id].parent();
    }
    ids.reverse();
    detach_path(arena, &ids)
}

fn detach_path(arena: &StateArena, ids: &[StateId]) -> Vec<State> {
    ids.iter()
        .enumerate()
        .map(|(i, &id)| arena[id].reparented(i.checked_sub(1).map(StateId::new)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Goal, GoalEdge};
    use crate::utils::state_from_rows;

    fn right_goal_state(rows: &[&str], goal_row: usize) -> State {
        state_from_rows(rows, Goal::new(GoalEdge::Right, goal_row)).unwrap()
    }

    fn one_blocker() -> State {
        right_goal_state(
            &["......", ".....A", "...PPA", "......", "......", "......"],
            2,
        )
    }

    fn labels(solution: &Solution) -> Vec<&str> {
        solution.path.iter().map(|s| s.label()).collect()
    }

    #[test]
    fn test_frontier_entry_ordering() {
        let mut heap = BinaryHeap::new();
        let entry = |key, primary_moved, seq| FrontierEntry {
            key,
            primary_moved,
            seq,
            id: StateId::new(seq as usize),
        };
        heap.push(entry(2, true, 0));
        heap.push(entry(1, false, 1));
        heap.push(entry(1, true, 2));
        heap.push(entry(1, false, 3));

        let order: Vec<u64> = std::iter::from_fn(|| heap.pop().map(|e| e.seq)).collect();
        assert_eq!(order, vec![2, 1, 3, 0]);
    }

    #[test]
    fn test_ucs_moves_blocker_then_exits() {
        let solution =
            standard_search(one_blocker(), FrontierOrder::Cost, None, &CancelToken::new()).unwrap();
        assert_eq!(
            labels(&solution),
            vec!["Start", "Move A Up", "Move P Right", "Move P Right 2x"]
        );
        assert_eq!(solution.steps(), 3);
        assert!(solution.nodes_explored > solution.path.len() as u64);
    }

    #[test]
    fn test_path_is_detached_and_costed() {
        let solution =
            standard_search(one_blocker(), FrontierOrder::Cost, None, &CancelToken::new()).unwrap();
        for (i, state) in solution.path.iter().enumerate() {
            assert_eq!(state.cost() as usize, i);
            assert_eq!(state.parent(), i.checked_sub(1).map(StateId::new));
        }
        let last = solution.path.last().unwrap();
        assert!(last.primary_piece().is_none());
        assert_eq!(last.board().to_string().matches('P').count(), 0);
    }

    #[test]
    fn test_goal_at_root_only_slides_off() {
        let state = right_goal_state(&["....", "..PP"], 1);
        let solution = standard_search(state, FrontierOrder::Cost, None, &CancelToken::new()).unwrap();
        assert_eq!(labels(&solution), vec!["Start", "Move P Right 2x"]);
        // One pop plus the two primary cells.
        assert_eq!(solution.nodes_explored, 3);
    }

    #[test]
    fn test_boxed_in_primary_returns_empty_path() {
        // A horizontal blocker in the goal row can never leave it.
        let state = right_goal_state(
            &["......", "......", "PP.AA.", "......", "......", "......"],
            2,
        );
        for order in [
            FrontierOrder::Cost,
            FrontierOrder::Estimate,
            FrontierOrder::CostPlusEstimate,
        ] {
            let solution =
                standard_search(state.clone(), order, Some(Heuristic::Combined), &CancelToken::new())
                    .unwrap();
            assert!(solution.path.is_empty());
            assert!(solution.nodes_explored > 0);
        }

        let solution = ida_star_search(state, Heuristic::Combined, &CancelToken::new()).unwrap();
        assert!(solution.path.is_empty());
    }

    #[test]
    fn test_ida_star_exhausts_crowded_boxed_in_board() {
        // Q can shuffle along the goal row but always stays ahead of P.
        let state = right_goal_state(
            &["A.....", "A..B..", "PP.BQQ", "..C...", "..C...", "DD...."],
            2,
        );
        let ucs = standard_search(state.clone(), FrontierOrder::Cost, None, &CancelToken::new())
            .unwrap();
        assert!(ucs.path.is_empty());

        for heuristic in Heuristic::ALL {
            let solution = ida_star_search(state.clone(), heuristic, &CancelToken::new()).unwrap();
            assert!(solution.path.is_empty(), "{}", heuristic);
        }
    }

    #[test]
    fn test_ida_star_path_parents_follow_depth() {
        let state = right_goal_state(
            &["AAB...", "..B.C.", "PP..C.", "..DDD.", "E.....", "E..FF."],
            2,
        );
        let solution = ida_star_search(state, Heuristic::BlockerCount, &CancelToken::new()).unwrap();
        assert!(solution.is_solved());
        for (i, step) in solution.path.iter().enumerate() {
            assert_eq!(step.parent(), i.checked_sub(1).map(StateId::new));
            assert_eq!(step.cost() as usize, i);
        }
    }

    #[test]
    fn test_never_expands_a_board_twice() {
        let state = right_goal_state(
            &["AAB...", "..B.C.", "PP..C.", "..DDD.", "E.....", "E..FF."],
            2,
        );
        for order in [
            FrontierOrder::Cost,
            FrontierOrder::Estimate,
            FrontierOrder::CostPlusEstimate,
        ] {
            let mut expanded = HashSet::new();
            let solution = standard_search_observed(
                state.clone(),
                order,
                Some(Heuristic::Combined),
                &CancelToken::new(),
                |s| assert!(expanded.insert(s.board().canonical_key()), "expanded twice"),
            )
            .unwrap();
            assert!(!solution.path.is_empty());
        }
    }

    #[test]
    fn test_greedy_and_astar_reach_the_goal() {
        for order in [FrontierOrder::Estimate, FrontierOrder::CostPlusEstimate] {
            let solution =
                standard_search(one_blocker(), order, Some(Heuristic::Combined), &CancelToken::new())
                    .unwrap();
            assert_eq!(solution.path.last().unwrap().label(), "Move P Right 2x");
            assert_eq!(solution.path[0].heuristic(), Some(3));
        }
    }

    #[test]
    fn test_ida_star_matches_ucs_on_simple_puzzle() {
        let ucs =
            standard_search(one_blocker(), FrontierOrder::Cost, None, &CancelToken::new()).unwrap();
        let ida = ida_star_search(one_blocker(), Heuristic::Distance, &CancelToken::new()).unwrap();
        assert_eq!(ida.steps(), ucs.steps());
        assert_eq!(ida.path.last().unwrap().label(), "Move P Right 2x");
        for (i, state) in ida.path.iter().enumerate() {
            assert_eq!(state.parent(), i.checked_sub(1).map(StateId::new));
        }
    }

    #[test]
    fn test_ida_star_is_deterministic() {
        let state = right_goal_state(
            &["AAB...", "..B.C.", "PP..C.", "..DDD.", "E.....", "E..FF."],
            2,
        );
        let first = ida_star_search(state.clone(), Heuristic::Combined, &CancelToken::new()).unwrap();
        let second = ida_star_search(state, Heuristic::Combined, &CancelToken::new()).unwrap();
        assert_eq!(labels(&first), labels(&second));
        assert_eq!(first.nodes_explored, second.nodes_explored);
    }

    #[test]
    fn test_cancelled_token_stops_both_searches() {
        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(
            standard_search(one_blocker(), FrontierOrder::Cost, None, &cancel).unwrap_err(),
            SolveError::Cancelled
        );
        assert_eq!(
            ida_star_search(one_blocker(), Heuristic::Distance, &cancel).unwrap_err(),
            SolveError::Cancelled
        );
    }
}
