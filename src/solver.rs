use crate::error::{ConfigError, SolveError};
use crate::heuristics::Heuristic;
use crate::search::{ida_star_search, standard_search, FrontierOrder};
use crate::state::State;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::info;

/// The search algorithms the solver can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Uniform-cost search, ordered by path cost.
    Ucs,
    /// Greedy best-first search, ordered by the heuristic alone.
    Greedy,
    /// A*, ordered by path cost plus heuristic.
    AStar,
    /// Iterative-deepening A*.
    IdaStar,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Ucs,
        Algorithm::Greedy,
        Algorithm::AStar,
        Algorithm::IdaStar,
    ];

    /// Every algorithm except UCS needs a heuristic.
    pub fn requires_heuristic(&self) -> bool {
        !matches!(self, Algorithm::Ucs)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Algorithm::Ucs => "UCS",
            Algorithm::Greedy => "Greedy Best First",
            Algorithm::AStar => "A*",
            Algorithm::IdaStar => "IDA*",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    /// Accepts the display names and selector names such as `UCS`, `GREEDY`,
    /// `ASTAR` or `IDA_STAR`, ignoring case, spaces, dashes and underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_uppercase();
        match normalized.as_str() {
            "UCS" | "UNIFORMCOST" => Ok(Algorithm::Ucs),
            "GREEDY" | "GREEDYBESTFIRST" | "GBFS" => Ok(Algorithm::Greedy),
            "A*" | "ASTAR" => Ok(Algorithm::AStar),
            "IDA*" | "IDASTAR" => Ok(Algorithm::IdaStar),
            _ => Err(ConfigError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// A validated algorithm/heuristic pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    algorithm: Algorithm,
    heuristic: Option<Heuristic>,
}

impl SolverConfig {
    /// Creates a configuration.
    ///
    /// UCS ignores any heuristic it is given; the stored heuristic is `None`.
    ///
    /// # Errors
    /// `ConfigError::MissingHeuristic` if `algorithm` needs a heuristic and none
    /// was given.
    ///
    /// # Examples
    /// ```
    /// use rush_hour_solver::heuristics::Heuristic;
    /// use rush_hour_solver::solver::{Algorithm, SolverConfig};
    ///
    /// let config = SolverConfig::new(Algorithm::AStar, Some(Heuristic::Combined)).unwrap();
    /// assert_eq!(config.heuristic(), Some(Heuristic::Combined));
    /// assert!(SolverConfig::new(Algorithm::IdaStar, None).is_err());
    /// ```
    pub fn new(algorithm: Algorithm, heuristic: Option<Heuristic>) -> Result<Self, ConfigError> {
        if !algorithm.requires_heuristic() {
            return Ok(SolverConfig {
                algorithm,
                heuristic: None,
            });
        }
        match heuristic {
            Some(_) => Ok(SolverConfig {
                algorithm,
                heuristic,
            }),
            None => Err(ConfigError::MissingHeuristic(algorithm)),
        }
    }

    /// Builds a configuration from selector names, e.g. `("ASTAR", Some("COMBINED"))`.
    pub fn from_names(algorithm: &str, heuristic: Option<&str>) -> Result<Self, ConfigError> {
        let algorithm: Algorithm = algorithm.parse()?;
        let heuristic = heuristic.map(str::parse::<Heuristic>).transpose()?;
        SolverConfig::new(algorithm, heuristic)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn heuristic(&self) -> Option<Heuristic> {
        self.heuristic
    }
}

/// The outcome of a search.
#[derive(Clone, Debug)]
pub struct Solution {
    /// States from the initial state to the slide-off state; empty when the
    /// puzzle has no solution. `path[i].parent()` is `Some(StateId::new(i - 1))`.
    pub path: Vec<State>,
    /// Search effort, counted the way each algorithm defines it.
    pub nodes_explored: u64,
}

impl Solution {
    pub fn is_solved(&self) -> bool {
        !self.path.is_empty()
    }

    /// Number of moves, including the final slide-off.
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Move labels in order, without the initial `"Start"`.
    pub fn moves(&self) -> impl Iterator<Item = &str> + '_ {
        self.path.iter().skip(1).map(|state| state.label())
    }
}

/// A shared flag that asks a running search to stop.
///
/// Clones share the flag. Searches check it once per expansion.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Solves the puzzle starting at `initial` with the configured algorithm.
///
/// An unsolvable puzzle is not an error: the returned solution has an empty path.
///
/// # Examples
/// ```
/// use rush_hour_solver::solver::{solve, Algorithm, SolverConfig};
/// use rush_hour_solver::utils::parse_puzzle;
///
/// let puzzle = parse_puzzle("4 4\n1\n...A\nPP.AK\n....\n....\n").unwrap();
/// let config = SolverConfig::new(Algorithm::Ucs, None).unwrap();
/// let solution = solve(puzzle.initial_state().unwrap(), &config).unwrap();
/// assert_eq!(solution.moves().last(), Some("Move P Right 2x"));
/// ```
pub fn solve(initial: State, config: &SolverConfig) -> Result<Solution, SolveError> {
    solve_with_cancel(initial, config, &CancelToken::new())
}

/// Like `solve`, but stops with `SolveError::Cancelled` once `cancel` is set.
pub fn solve_with_cancel(
    initial: State,
    config: &SolverConfig,
    cancel: &CancelToken,
) -> Result<Solution, SolveError> {
    info!(
        event = "solve_start",
        algorithm = %config.algorithm,
        heuristic = ?config.heuristic,
        rows = initial.board().rows(),
        cols = initial.board().cols(),
        pieces = initial.pieces().len()
    );

    let result = match (config.algorithm, config.heuristic) {
        (Algorithm::Ucs, _) => standard_search(initial, FrontierOrder::Cost, None, cancel),
        (Algorithm::Greedy, Some(h)) => {
            standard_search(initial, FrontierOrder::Estimate, Some(h), cancel)
        }
        (Algorithm::AStar, Some(h)) => {
            standard_search(initial, FrontierOrder::CostPlusEstimate, Some(h), cancel)
        }
        (Algorithm::IdaStar, Some(h)) => ida_star_search(initial, h, cancel),
        (algorithm, None) => Err(ConfigError::MissingHeuristic(algorithm).into()),
    };

    match &result {
        Ok(solution) => info!(
            event = "solve_end",
            solved = solution.is_solved(),
            steps = solution.steps(),
            nodes_explored = solution.nodes_explored
        ),
        Err(err) => info!(event = "solve_end", error = %err),
    }
    result
}

/// A finished background solve.
#[derive(Clone, Debug)]
pub struct SolveReport {
    pub solution: Solution,
    /// Wall-clock time spent in the search.
    pub elapsed: Duration,
}

/// Handle to a solve running on a worker thread.
#[derive(Debug)]
pub struct SolveHandle {
    cancel: CancelToken,
    worker: JoinHandle<()>,
}

impl SolveHandle {
    /// Asks the search to stop; the callback then receives `SolveError::Cancelled`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Waits for the worker (and its callback) to finish.
    pub fn join(self) -> thread::Result<()> {
        self.worker.join()
    }
}

/// Runs `solve` on a new thread and hands the result to `on_complete` there.
pub fn spawn_solve<F>(initial: State, config: SolverConfig, on_complete: F) -> SolveHandle
where
    F: FnOnce(Result<SolveReport, SolveError>) + Send + 'static,
{
    let cancel = CancelToken::new();
    let token = cancel.clone();
    let worker = thread::spawn(move || {
        let started = Instant::now();
        let result = solve_with_cancel(initial, &config, &token).map(|solution| SolveReport {
            solution,
            elapsed: started.elapsed(),
        });
        on_complete(result);
    });
    SolveHandle { cancel, worker }
}
