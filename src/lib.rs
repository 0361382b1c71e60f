//! # grid_search_sandbox
//!
//! A grid-based pathfinding sandbox. Five interchangeable search strategies
//! (A*, Dijkstra, breadth-first, depth-first and tabular Q-learning) solve
//! the same problem: route from a start cell to an end cell on a 2-D grid
//! with wall cells. A recursive-backtracking maze generator produces the
//! grids the strategies are exercised against.
//!
//! The [Engine](engine::Engine) validates the configuration, resets search
//! state and dispatches to the selected solver; hosts observe progress one
//! visited cell at a time through a [StepObserver](engine::StepObserver),
//! which makes the core drainable at full speed in tests and pacable by an
//! animating frontend. All traversal cost is uniform per step.
//!
//! ```
//! use grid_search_sandbox::{Algorithm, Engine, Grid, NoopObserver, Point};
//!
//! let mut grid = Grid::new(5, 5, Point::new(0, 0), Point::new(4, 4)).unwrap();
//! grid.set_wall(2, 2, true);
//! let mut engine = Engine::new();
//! let result = engine
//!     .execute(Algorithm::AStar, &mut grid, &mut NoopObserver)
//!     .unwrap();
//! assert_eq!(result.path.len(), 9);
//! ```

pub mod engine;
pub mod grid;
pub mod maze;
pub mod point;
pub mod solver;

pub use engine::{
    Algorithm, Engine, EngineError, FnObserver, NoopObserver, SearchResult, StepEvent,
    StepObserver,
};
pub use grid::{Cell, Grid, GridError, Marker, UNREACHABLE};
pub use maze::generate_maze;
pub use point::{Direction, Point};
