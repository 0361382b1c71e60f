use fxhash::FxHashSet;
use log::warn;

use crate::engine::{SearchResult, StepObserver};
use crate::grid::Grid;
use crate::point::Point;
use crate::solver::{mark_visited, reconstruct_path, Solver};

/// Depth-first search: LIFO frontier. Guarantees reachability only; the
/// returned path is valid but generally not minimal.
#[derive(Clone, Copy, Debug, Default)]
pub struct DfsSolver;

impl Solver for DfsSolver {
    fn solve(&mut self, grid: &mut Grid, observer: &mut dyn StepObserver) -> SearchResult {
        let start = grid.start();
        let end = grid.end();
        let mut frontier: Vec<Point> = Vec::new();
        let mut visited: FxHashSet<Point> = FxHashSet::default();
        let mut visited_count = 0;

        grid.cell_mut(start).distance = 0;
        frontier.push(start);

        while let Some(current) = frontier.pop() {
            if visited.contains(&current) || grid.cell(current).is_wall {
                continue;
            }
            visited.insert(current);
            let distance = grid.cell(current).distance;
            mark_visited(grid, current, distance, &mut visited_count, observer);

            if current == end {
                return SearchResult {
                    path: reconstruct_path(grid, end),
                    visited_count,
                };
            }

            // Neighbors are pushed in exploration order; the most recently
            // pushed one is explored next. Re-pushing an undiscovered
            // neighbor re-parents it onto the deeper branch, which keeps the
            // parent chain rooted at a finalized cell and therefore acyclic.
            for n in grid.neighbors(current) {
                if grid.cell(n).is_wall || visited.contains(&n) {
                    continue;
                }
                let cell = grid.cell_mut(n);
                cell.parent = Some(current);
                cell.distance = distance + 1;
                frontier.push(n);
            }
        }

        warn!("depth-first search exhausted the frontier without reaching the end");
        SearchResult {
            path: Vec::new(),
            visited_count,
        }
    }
}
