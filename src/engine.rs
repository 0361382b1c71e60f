use core::fmt;
use std::str::FromStr;

use log::info;
use thiserror::Error;

use crate::grid::{Grid, GridError, Marker};
use crate::point::Point;
use crate::solver::{
    AstarSolver, BfsSolver, DfsSolver, DijkstraSolver, QLearningSolver, Solver,
};

/// One step notification: a cell was just transitioned to "visited".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepEvent {
    pub pos: Point,
    /// Cost so far at the visited cell: step distance for the frontier
    /// searches, g-score for A*, rollout step index for Q-learning.
    pub distance: i32,
}

/// Purely observational hook invoked once per visited cell, after the
/// grid mutation for that step is complete. Animation pacing (the host's
/// delay setting) lives inside the observer; a no-op observer drains a run
/// at full speed.
pub trait StepObserver {
    fn visited(&mut self, event: StepEvent);
}

/// Observer for non-interactive use; every yield is free.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl StepObserver for NoopObserver {
    fn visited(&mut self, _event: StepEvent) {}
}

/// Adapter turning a closure into a [StepObserver].
pub struct FnObserver<F>(pub F);

impl<F: FnMut(StepEvent)> StepObserver for FnObserver<F> {
    fn visited(&mut self, event: StepEvent) {
        (self.0)(event)
    }
}

/// Outcome of a run. An empty path is the normal "no route" terminal
/// outcome, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    /// Ordered coordinates from start to end inclusive; empty if no route
    /// was found.
    pub path: Vec<Point>,
    pub visited_count: usize,
}

/// The closed set of search strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    AStar,
    Dijkstra,
    Bfs,
    Dfs,
    QLearning,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::AStar,
        Algorithm::Dijkstra,
        Algorithm::Bfs,
        Algorithm::Dfs,
        Algorithm::QLearning,
    ];
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Algorithm::AStar => "astar",
            Algorithm::Dijkstra => "dijkstra",
            Algorithm::Bfs => "bfs",
            Algorithm::Dfs => "dfs",
            Algorithm::QLearning => "qlearning",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Algorithm {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Algorithm, EngineError> {
        match s {
            "astar" => Ok(Algorithm::AStar),
            "dijkstra" => Ok(Algorithm::Dijkstra),
            "bfs" => Ok(Algorithm::Bfs),
            "dfs" => Ok(Algorithm::Dfs),
            "qlearning" => Ok(Algorithm::QLearning),
            _ => Err(EngineError::UnknownAlgorithm(s.to_owned())),
        }
    }
}

/// Configuration faults reported to the caller before any search state is
/// mutated. No-path-found is never an error; see [SearchResult].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("unknown algorithm name {0:?}")]
    UnknownAlgorithm(String),
    #[error("a run is already in progress")]
    RunInProgress,
    #[error("start and end markers coincide")]
    DegenerateMarkers,
    #[error("the {0:?} marker sits on a wall")]
    MarkerOnWall(Marker),
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Run coordinator: validates the configuration, resets search state,
/// dispatches to the selected solver and reports the result. One run at a
/// time; a nested invocation is rejected rather than queued.
///
/// The engine owns the Q-learning agent so its table can persist across
/// runs of other algorithms; call [reset_agent](Self::reset_agent) whenever
/// the grid layout changes.
#[derive(Clone, Debug)]
pub struct Engine {
    running: bool,
    qlearning: QLearningSolver,
}

impl Default for Engine {
    fn default() -> Engine {
        Engine::new()
    }
}

impl Engine {
    pub fn new() -> Engine {
        Engine {
            running: false,
            qlearning: QLearningSolver::new(),
        }
    }

    /// Engine with a deterministic Q-learning agent.
    pub fn with_seed(seed: u64) -> Engine {
        Engine {
            running: false,
            qlearning: QLearningSolver::with_seed(seed),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Discards the Q-learning table and restores its exploration rate.
    pub fn reset_agent(&mut self) {
        self.qlearning.reset();
    }

    /// Runs the selected algorithm against the grid. Configuration errors
    /// are reported synchronously before any search state mutation; an
    /// unreachable end cell is not an error and yields an empty path.
    pub fn execute(
        &mut self,
        algorithm: Algorithm,
        grid: &mut Grid,
        observer: &mut dyn StepObserver,
    ) -> Result<SearchResult, EngineError> {
        if self.running {
            return Err(EngineError::RunInProgress);
        }
        let start = grid.start();
        let end = grid.end();
        if start == end {
            return Err(EngineError::DegenerateMarkers);
        }
        if grid.cell(start).is_wall {
            return Err(EngineError::MarkerOnWall(Marker::Start));
        }
        if grid.cell(end).is_wall {
            return Err(EngineError::MarkerOnWall(Marker::End));
        }

        self.running = true;
        info!("running {} from {} to {}", algorithm, start, end);
        grid.reset_search_state();
        let result = match algorithm {
            Algorithm::AStar => AstarSolver.solve(grid, observer),
            Algorithm::Dijkstra => DijkstraSolver.solve(grid, observer),
            Algorithm::Bfs => BfsSolver.solve(grid, observer),
            Algorithm::Dfs => DfsSolver.solve(grid, observer),
            Algorithm::QLearning => self.qlearning.solve(grid, observer),
        };
        self.running = false;

        info!(
            "{} finished: path length {}, {} cells visited",
            algorithm,
            result.path.len(),
            result.visited_count
        );
        Ok(result)
    }

    /// Name-based entry point for hosts driving the engine from a string
    /// setting. Fails with [EngineError::UnknownAlgorithm] on anything
    /// outside the closed set.
    pub fn execute_named(
        &mut self,
        name: &str,
        grid: &mut Grid,
        observer: &mut dyn StepObserver,
    ) -> Result<SearchResult, EngineError> {
        let algorithm = name.parse()?;
        self.execute(algorithm, grid, observer)
    }
}
