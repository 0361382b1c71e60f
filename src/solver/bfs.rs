use std::collections::VecDeque;

use fxhash::FxHashSet;
use log::warn;

use crate::engine::{SearchResult, StepObserver};
use crate::grid::Grid;
use crate::point::Point;
use crate::solver::{mark_visited, reconstruct_path, Solver};

/// Breadth-first search: FIFO frontier, uniform step cost. The first time
/// the end cell is dequeued its parent chain is a shortest path in step
/// count.
#[derive(Clone, Copy, Debug, Default)]
pub struct BfsSolver;

impl Solver for BfsSolver {
    fn solve(&mut self, grid: &mut Grid, observer: &mut dyn StepObserver) -> SearchResult {
        let start = grid.start();
        let end = grid.end();
        let mut frontier: VecDeque<Point> = VecDeque::new();
        let mut visited: FxHashSet<Point> = FxHashSet::default();
        let mut visited_count = 0;

        grid.cell_mut(start).distance = 0;
        frontier.push_back(start);

        while let Some(current) = frontier.pop_front() {
            // Duplicate frontier entries are filtered here, at pop time.
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

            for n in grid.neighbors(current) {
                let cell = grid.cell(n);
                if cell.is_wall || visited.contains(&n) {
                    continue;
                }
                // First discovery wins; a later, deeper rediscovery must not
                // re-parent the cell or the shortest-path guarantee breaks.
                if cell.parent.is_none() && !cell.is_start {
                    let cell = grid.cell_mut(n);
                    cell.parent = Some(current);
                    cell.distance = distance + 1;
                    frontier.push_back(n);
                }
            }
        }

        warn!("breadth-first search exhausted the frontier without reaching the end");
        SearchResult {
            path: Vec::new(),
            visited_count,
        }
    }
}
