use core::fmt;
use std::ops::Add;

use smallvec::SmallVec;

/// Integer grid coordinates. Identifies a cell uniquely within a [Grid](crate::grid::Grid).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Point {
        Point { x, y }
    }

    /// Manhattan distance, the admissible and consistent heuristic for
    /// 4-directional unit-cost grids.
    pub fn manhattan_distance(&self, other: &Point) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// The 4-directional (von Neumann) neighborhood in the fixed exploration
    /// order up, right, down, left. No bounds filtering is done here.
    pub fn neumann_neighborhood(&self) -> SmallVec<[Point; 4]> {
        Direction::EXPLORATION_ORDER
            .iter()
            .map(|d| *self + d.offset())
            .collect()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The four cardinal movement directions. `y` grows downwards, matching the
/// row-major grid layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Neighbor exploration order shared by the frontier-based searches.
    pub const EXPLORATION_ORDER: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub const fn offset(self) -> Point {
        match self {
            Direction::Up => Point::new(0, -1),
            Direction::Right => Point::new(1, 0),
            Direction::Down => Point::new(0, 1),
            Direction::Left => Point::new(-1, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_is_symmetric() {
        let a = Point::new(1, 2);
        let b = Point::new(4, 6);
        assert_eq!(a.manhattan_distance(&b), 7);
        assert_eq!(b.manhattan_distance(&a), 7);
    }

    #[test]
    fn neighborhood_order_is_up_right_down_left() {
        let p = Point::new(3, 3);
        let expected = [
            Point::new(3, 2),
            Point::new(4, 3),
            Point::new(3, 4),
            Point::new(2, 3),
        ];
        assert_eq!(p.neumann_neighborhood().as_slice(), &expected);
    }
}
