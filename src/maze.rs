use log::info;
use rand::Rng;
use smallvec::SmallVec;

use crate::grid::Grid;
use crate::point::Point;

/// Lattice steps two cells apart, in the order up, right, down, left.
const LATTICE_STEPS: [Point; 4] = [
    Point::new(0, -2),
    Point::new(2, 0),
    Point::new(0, 2),
    Point::new(-2, 0),
];

/// Carves a perfect maze into the grid using recursive backtracking over
/// the step-2 interior lattice anchored at `(1, 1)`: every lattice cell is
/// visited exactly once, each carve opens the chosen neighbor and the wall
/// cell between, and backtracking pops when no unvisited lattice neighbor
/// remains. The resulting open cells form a spanning tree: fully connected,
/// no cycles.
///
/// The cells currently holding the start/end markers are never walled over.
/// Grids too small to contain `(1, 1)` in their interior are left fully
/// open.
pub fn generate_maze<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) {
    grid.reset_search_state();
    grid.clear_walls();

    let width = grid.width();
    let height = grid.height();
    if width <= 2 || height <= 2 {
        info!("grid {}x{} has no interior lattice, skipping maze", width, height);
        return;
    }

    // Carve on a scratch matrix first; walls are applied to the grid in one
    // pass so the start/end no-op rule is enforced by set_wall alone.
    let mut walls = vec![true; (width * height) as usize];
    let ix = |p: Point| (p.y * width + p.x) as usize;

    let origin = Point::new(1, 1);
    walls[ix(origin)] = false;
    let mut stack: Vec<Point> = vec![origin];

    while let Some(&current) = stack.last() {
        let unvisited: SmallVec<[Point; 4]> = LATTICE_STEPS
            .iter()
            .map(|step| current + *step)
            .filter(|p| {
                p.x > 0 && p.x < width - 1 && p.y > 0 && p.y < height - 1 && walls[ix(*p)]
            })
            .collect();

        if unvisited.is_empty() {
            stack.pop();
        } else {
            let next = unvisited[rng.gen_range(0..unvisited.len())];
            let between = Point::new((current.x + next.x) / 2, (current.y + next.y) / 2);
            walls[ix(between)] = false;
            walls[ix(next)] = false;
            stack.push(next);
        }
    }

    for y in 0..height {
        for x in 0..width {
            grid.set_wall(x, y, walls[(y * width + x) as usize]);
        }
    }
    grid.update();
}
