use fxhash::FxHashSet;
use log::warn;

use crate::engine::{SearchResult, StepObserver};
use crate::grid::{Grid, UNREACHABLE};
use crate::point::Point;
use crate::solver::{mark_visited, reconstruct_path, Solver};

/// Dijkstra over the uniform-cost grid. The unvisited pool holds every
/// non-wall cell in row-major order; minimum extraction is a linear scan,
/// which keeps tie-breaking deterministic (first-encountered minimum).
#[derive(Clone, Copy, Debug, Default)]
pub struct DijkstraSolver;

impl Solver for DijkstraSolver {
    fn solve(&mut self, grid: &mut Grid, observer: &mut dyn StepObserver) -> SearchResult {
        let start = grid.start();
        let end = grid.end();
        let mut visited: FxHashSet<Point> = FxHashSet::default();
        let mut visited_count = 0;

        let mut unvisited: Vec<Point> = Vec::with_capacity((grid.width() * grid.height()) as usize);
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let p = Point::new(x, y);
                if !grid.cell(p).is_wall {
                    unvisited.push(p);
                }
            }
        }
        grid.cell_mut(start).distance = 0;

        while !unvisited.is_empty() {
            let mut current_ix = 0;
            for i in 1..unvisited.len() {
                if grid.cell(unvisited[i]).distance < grid.cell(unvisited[current_ix]).distance {
                    current_ix = i;
                }
            }
            let current = unvisited.remove(current_ix);
            let distance = grid.cell(current).distance;
            if distance == UNREACHABLE {
                // Nothing reachable remains in the pool.
                break;
            }

            visited.insert(current);
            mark_visited(grid, current, distance, &mut visited_count, observer);

            if current == end {
                return SearchResult {
                    path: reconstruct_path(grid, end),
                    visited_count,
                };
            }

            for n in grid.neighbors(current) {
                if visited.contains(&n) || grid.cell(n).is_wall {
                    continue;
                }
                let tentative = distance + 1;
                if tentative < grid.cell(n).distance {
                    let cell = grid.cell_mut(n);
                    cell.distance = tentative;
                    cell.parent = Some(current);
                }
            }
        }

        warn!("dijkstra exhausted the reachable cells without extracting the end");
        SearchResult {
            path: Vec::new(),
            visited_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NoopObserver;

    #[test]
    fn straight_line_has_manhattan_length() {
        let mut grid = Grid::new(6, 1, Point::new(0, 0), Point::new(5, 0)).unwrap();
        let result = DijkstraSolver.solve(&mut grid, &mut NoopObserver);
        assert_eq!(result.path.len(), 6);
    }

    #[test]
    fn routes_around_an_obstacle() {
        // Wall in the middle forces a detour of equal minimal length.
        let mut grid = Grid::new(3, 3, Point::new(0, 0), Point::new(2, 2)).unwrap();
        grid.set_wall(1, 1, true);
        let result = DijkstraSolver.solve(&mut grid, &mut NoopObserver);
        assert_eq!(result.path.len(), 5);
        assert!(result.path.iter().all(|p| *p != Point::new(1, 1)));
    }

    #[test]
    fn stops_early_when_pool_is_unreachable() {
        let mut grid = Grid::new(5, 5, Point::new(0, 0), Point::new(4, 4)).unwrap();
        for y in 0..5 {
            grid.set_wall(2, y, true);
        }
        let result = DijkstraSolver.solve(&mut grid, &mut NoopObserver);
        assert!(result.path.is_empty());
        assert_eq!(result.visited_count, 9);
    }
}
