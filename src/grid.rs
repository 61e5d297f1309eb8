//! Integer grid coordinates shared by both games.

use std::ops::Add;

/// Grid coordinate. `y` grows downwards; row 0 is the top of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Wraps both components into `[0, cols) × [0, rows)` (toroidal topology).
    pub const fn wrapped(self, cols: i32, rows: i32) -> Self {
        Self::new(self.x.rem_euclid(cols), self.y.rem_euclid(rows))
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.offset(rhs.x, rhs.y)
    }
}
