use crate::engine::{SearchResult, StepEvent, StepObserver};
use crate::grid::Grid;
use crate::point::Point;

pub mod astar;
pub mod bfs;
pub mod dfs;
pub mod dijkstra;
pub mod qlearning;

pub use astar::AstarSolver;
pub use bfs::BfsSolver;
pub use dfs::DfsSolver;
pub use dijkstra::DijkstraSolver;
pub use qlearning::QLearningSolver;

/// A search strategy over a [Grid]. The five concrete solvers are selected
/// through [Algorithm](crate::engine::Algorithm); there is no open-ended
/// lookup by name beyond that closed set.
pub trait Solver {
    /// Runs the search to completion. Expects the grid's search working
    /// fields to be freshly reset; visitation flags are mutated as an
    /// observable side effect and the observer is notified once per newly
    /// visited intermediate cell.
    fn solve(&mut self, grid: &mut Grid, observer: &mut dyn StepObserver) -> SearchResult;
}

/// Display-marks a freshly finalized cell and notifies the observer. The
/// start and end cells participate in every search but never count as
/// visited for reporting purposes.
pub(crate) fn mark_visited(
    grid: &mut Grid,
    pos: Point,
    metric: i32,
    visited_count: &mut usize,
    observer: &mut dyn StepObserver,
) {
    let cell = grid.cell_mut(pos);
    if cell.is_start || cell.is_end {
        return;
    }
    cell.is_visited = true;
    *visited_count += 1;
    observer.visited(StepEvent {
        pos,
        distance: metric,
    });
}

/// Walks the parent back-pointers from the end cell and reverses the chain
/// so the path runs start to end inclusive. Intermediate route cells get
/// their `is_path` flag set.
pub(crate) fn reconstruct_path(grid: &mut Grid, end: Point) -> Vec<Point> {
    let mut path: Vec<Point> = itertools::unfold(Some(end), |state| {
        state.map(|p| {
            *state = grid.cell(p).parent;
            p
        })
    })
    .collect();
    path.reverse();
    if path.len() > 2 {
        for &p in &path[1..path.len() - 1] {
            grid.cell_mut(p).is_path = true;
        }
    }
    path
}
