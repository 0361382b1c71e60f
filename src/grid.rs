use core::fmt;

use log::info;
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;
use thiserror::Error;

use crate::point::Point;

/// Sentinel for "not yet reached" on the search working fields.
pub const UNREACHABLE: i32 = i32::MAX;

/// Errors raised by layout-editing operations. Search failures are never
/// reported through this type; a run that finds no route returns an empty
/// path instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("grid dimensions {0}x{1} are not positive")]
    InvalidDimensions(i32, i32),
    #[error("coordinates {0} are out of bounds")]
    OutOfBounds(Point),
    #[error("start and end markers cannot occupy the same cell")]
    MarkerOverlap,
}

/// Which of the two route endpoints a marker operation addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    Start,
    End,
}

/// A single grid cell. Layout flags (`is_wall`, `is_start`, `is_end`) persist
/// across runs; the remaining fields are search working state and are wiped
/// by [Grid::reset_search_state] before every run.
#[derive(Clone, Debug)]
pub struct Cell {
    pub pos: Point,
    pub is_wall: bool,
    pub is_start: bool,
    pub is_end: bool,
    pub is_visited: bool,
    pub is_path: bool,
    pub distance: i32,
    pub g_score: i32,
    pub f_score: i32,
    /// Back-pointer for path reconstruction, stored as a coordinate rather
    /// than a reference so parent chains can never form ownership cycles.
    pub parent: Option<Point>,
}

impl Cell {
    fn new(pos: Point) -> Cell {
        Cell {
            pos,
            is_wall: false,
            is_start: false,
            is_end: false,
            is_visited: false,
            is_path: false,
            distance: UNREACHABLE,
            g_score: UNREACHABLE,
            f_score: UNREACHABLE,
            parent: None,
        }
    }

    fn clear_search_state(&mut self) {
        self.is_visited = false;
        self.is_path = false;
        self.distance = UNREACHABLE;
        self.g_score = UNREACHABLE;
        self.f_score = UNREACHABLE;
        self.parent = None;
    }
}

/// The shared cell matrix all five strategies run against. Maintains the
/// start/end markers in sync with the denormalized cell flags, and a
/// [UnionFind] component partition over open cells so hosts can answer
/// reachability queries without running a search. The solvers themselves
/// never consult the components; termination is always decided by frontier
/// exhaustion.
#[derive(Clone, Debug)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
    start: Point,
    end: Point,
    components: UnionFind<usize>,
    components_dirty: bool,
}

impl Grid {
    /// Builds an all-open grid with the start and end markers placed.
    pub fn new(width: i32, height: i32, start: Point, end: Point) -> Result<Grid, GridError> {
        if width <= 0 || height <= 0 {
            return Err(GridError::InvalidDimensions(width, height));
        }
        let mut cells = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell::new(Point::new(x, y)));
            }
        }
        let mut grid = Grid {
            width,
            height,
            cells,
            start,
            end,
            components: UnionFind::new((width * height) as usize),
            components_dirty: true,
        };
        if !grid.in_bounds(start) {
            return Err(GridError::OutOfBounds(start));
        }
        if !grid.in_bounds(end) {
            return Err(GridError::OutOfBounds(end));
        }
        if start == end {
            return Err(GridError::MarkerOverlap);
        }
        grid.cell_mut(start).is_start = true;
        grid.cell_mut(end).is_end = true;
        grid.generate_components();
        Ok(grid)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.x < self.width && p.y >= 0 && p.y < self.height
    }

    fn index(&self, p: Point) -> usize {
        (p.y * self.width + p.x) as usize
    }

    /// Cell lookup; [None] when out of bounds.
    pub fn get(&self, p: Point) -> Option<&Cell> {
        if self.in_bounds(p) {
            Some(&self.cells[self.index(p)])
        } else {
            None
        }
    }

    /// Direct cell access. Callers are expected to have bounds-checked `p`.
    pub(crate) fn cell(&self, p: Point) -> &Cell {
        &self.cells[self.index(p)]
    }

    pub(crate) fn cell_mut(&mut self, p: Point) -> &mut Cell {
        let ix = self.index(p);
        &mut self.cells[ix]
    }

    /// Whether `p` can be stood on: in bounds and not a wall.
    pub fn passable(&self, p: Point) -> bool {
        self.in_bounds(p) && !self.cell(p).is_wall
    }

    /// In-bounds 4-neighbors of `p` in exploration order up, right, down,
    /// left. Walls are included; the searches filter them per their own
    /// rules.
    pub fn neighbors(&self, p: Point) -> SmallVec<[Point; 4]> {
        p.neumann_neighborhood()
            .into_iter()
            .filter(|n| self.in_bounds(*n))
            .collect()
    }

    /// Clears the search working fields on every cell, leaving walls and
    /// markers untouched. Called by the engine before each run so no state
    /// leaks from a prior algorithm.
    pub fn reset_search_state(&mut self) {
        for cell in &mut self.cells {
            cell.clear_search_state();
        }
    }

    /// Sets or clears a wall. Silently a no-op on the start/end cell and on
    /// out-of-bounds coordinates. Joins newly connected components and flags
    /// the partition dirty when a wall potentially splits one apart.
    pub fn set_wall(&mut self, x: i32, y: i32, value: bool) {
        let p = Point::new(x, y);
        if !self.in_bounds(p) {
            return;
        }
        let cell = self.cell(p);
        if cell.is_start || cell.is_end {
            return;
        }
        if cell.is_wall != value {
            if value {
                self.components_dirty = true;
            } else {
                let p_ix = self.index(p);
                for n in self.neighbors(p) {
                    if !self.cell(n).is_wall {
                        self.components.union(p_ix, self.index(n));
                    }
                }
            }
        }
        self.cell_mut(p).is_wall = value;
    }

    /// Opens every cell. Layout reset for hosts; search state is untouched.
    pub fn clear_walls(&mut self) {
        for cell in &mut self.cells {
            cell.is_wall = false;
        }
        self.generate_components();
    }

    /// Relocates the start or end marker, clearing the flag on the previous
    /// holder and the wall flag on the target. Rejects out-of-bounds targets
    /// and moving one marker onto the other.
    pub fn move_marker(&mut self, kind: Marker, x: i32, y: i32) -> Result<(), GridError> {
        let p = Point::new(x, y);
        if !self.in_bounds(p) {
            return Err(GridError::OutOfBounds(p));
        }
        let other = match kind {
            Marker::Start => self.end,
            Marker::End => self.start,
        };
        if p == other {
            return Err(GridError::MarkerOverlap);
        }
        let old = match kind {
            Marker::Start => self.start,
            Marker::End => self.end,
        };
        match kind {
            Marker::Start => self.cell_mut(old).is_start = false,
            Marker::End => self.cell_mut(old).is_end = false,
        }
        if self.cell(p).is_wall {
            // Clearing the wall reconnects the cell to its surroundings.
            let p_ix = self.index(p);
            for n in self.neighbors(p) {
                if !self.cell(n).is_wall {
                    self.components.union(p_ix, self.index(n));
                }
            }
        }
        let cell = self.cell_mut(p);
        cell.is_wall = false;
        match kind {
            Marker::Start => {
                cell.is_start = true;
                self.start = p;
            }
            Marker::End => {
                cell.is_end = true;
                self.end = p;
            }
        }
        Ok(())
    }

    /// Regenerates the components if they are marked as dirty.
    pub fn update(&mut self) {
        if self.components_dirty {
            info!("Components are dirty: regenerating components");
            self.generate_components();
        }
    }

    /// Generates a new [UnionFind] structure and links up open grid
    /// neighbours to the same components.
    pub fn generate_components(&mut self) {
        self.components = UnionFind::new((self.width * self.height) as usize);
        self.components_dirty = false;
        for y in 0..self.height {
            for x in 0..self.width {
                let p = Point::new(x, y);
                if self.cell(p).is_wall {
                    continue;
                }
                let p_ix = self.index(p);
                for n in [Point::new(x + 1, y), Point::new(x, y + 1)] {
                    if self.passable(n) {
                        self.components.union(p_ix, self.index(n));
                    }
                }
            }
        }
    }

    /// Checks whether two open cells lie on the same connected component.
    /// Regenerate with [update](Self::update) after adding walls before
    /// relying on the answer.
    pub fn reachable(&self, from: &Point, to: &Point) -> bool {
        if self.in_bounds(*from) && self.in_bounds(*to) {
            self.components.equiv(self.index(*from), self.index(*to))
        } else {
            false
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = self.cell(Point::new(x, y));
                let c = if cell.is_start {
                    'S'
                } else if cell.is_end {
                    'G'
                } else if cell.is_wall {
                    '#'
                } else {
                    '.'
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
