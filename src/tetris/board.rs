//! Persistent Tetris well: locked cells, collision tests, line clears.

use super::pieces::{self, Bitmap};
use crate::grid::Point;

pub const COLS: usize = 10;
pub const ROWS: usize = 20;

type Row = [u8; COLS];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Row; ROWS],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub const fn new() -> Self {
        Self {
            cells: [[0; COLS]; ROWS],
        }
    }

    /// Cell value at (`col`, `row`); `None` outside the well.
    pub fn get(&self, col: i32, row: i32) -> Option<u8> {
        let (c, r) = (usize::try_from(col).ok()?, usize::try_from(row).ok()?);
        self.cells.get(r)?.get(c).copied()
    }

    /// Writes `value` at (`col`, `row`); out-of-range writes are dropped.
    pub fn set(&mut self, col: i32, row: i32, value: u8) {
        let (Ok(c), Ok(r)) = (usize::try_from(col), usize::try_from(row)) else {
            return;
        };
        if let Some(cell) = self.cells.get_mut(r).and_then(|row| row.get_mut(c)) {
            *cell = value;
        }
    }

    pub fn rows(&self) -> &[Row; ROWS] {
        &self.cells
    }

    /// True when `bitmap` placed at `origin` leaves the side walls, passes the
    /// floor, or overlaps a locked cell. Cells above row 0 only check the walls.
    pub fn collides(&self, bitmap: &Bitmap, origin: Point) -> bool {
        pieces::cells(bitmap).any(|(dc, dr)| {
            let col = origin.x + dc;
            let row = origin.y + dr;
            if col < 0 || col >= COLS as i32 || row >= ROWS as i32 {
                return true;
            }
            row >= 0 && self.get(col, row).is_some_and(|v| v != 0)
        })
    }

    /// Writes the piece cells that fall inside the well.
    pub fn merge(&mut self, bitmap: &Bitmap, origin: Point, id: u8) {
        for (dc, dr) in pieces::cells(bitmap) {
            self.set(origin.x + dc, origin.y + dr, id);
        }
    }

    /// Removes every full row and prepends as many empty rows. Returns the
    /// number of rows removed.
    pub fn clear_full_rows(&mut self) -> usize {
        let kept: Vec<Row> = self
            .cells
            .iter()
            .filter(|row| row.iter().any(|&v| v == 0))
            .copied()
            .collect();
        let cleared = ROWS - kept.len();
        if cleared == 0 {
            return 0;
        }
        let mut next = [[0; COLS]; ROWS];
        next[cleared..].copy_from_slice(&kept);
        self.cells = next;
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tetris::pieces::TetrominoKind;

    #[test]
    fn test_walls_and_floor_collide() {
        let b = Board::new();
        let i_flat = TetrominoKind::I.rotation(0);
        assert!(!b.collides(i_flat, Point::new(0, 0)));
        assert!(!b.collides(i_flat, Point::new(6, 0)));
        assert!(b.collides(i_flat, Point::new(7, 0)));
        assert!(b.collides(i_flat, Point::new(-1, 0)));
        // row 1 of the bitmap is occupied, so origin row 18 puts it on row 19
        assert!(!b.collides(i_flat, Point::new(0, 18)));
        assert!(b.collides(i_flat, Point::new(0, 19)));
    }

    #[test]
    fn test_above_top_only_checks_walls() {
        let b = Board::new();
        let i_vert = TetrominoKind::I.rotation(1);
        assert!(!b.collides(i_vert, Point::new(3, -3)));
        assert!(b.collides(i_vert, Point::new(-3, -3)));
    }

    #[test]
    fn test_locked_cells_collide() {
        let mut b = Board::new();
        b.set(4, 10, 3);
        let o = TetrominoKind::O.rotation(0);
        assert!(b.collides(o, Point::new(3, 9)));
        assert!(!b.collides(o, Point::new(4, 9)));
    }

    #[test]
    fn test_merge_skips_cells_above_top() {
        let mut b = Board::new();
        b.merge(TetrominoKind::I.rotation(1), Point::new(0, -2), 1);
        assert_eq!(b.get(2, 0), Some(1));
        assert_eq!(b.get(2, 1), Some(1));
        assert_eq!(b.get(2, 2), Some(0));
    }

    #[test]
    fn test_clear_shifts_rows_down() {
        let mut b = Board::new();
        for c in 0..COLS as i32 {
            b.set(c, 19, 2);
        }
        b.set(0, 18, 5);
        assert_eq!(b.clear_full_rows(), 1);
        assert_eq!(b.get(0, 19), Some(5));
        assert!(b.rows()[0].iter().all(|&v| v == 0));
        assert_eq!(b.rows().iter().flatten().filter(|&&v| v != 0).count(), 1);
    }

    #[test]
    fn test_clear_without_full_rows_is_identity() {
        let mut b = Board::new();
        b.set(3, 7, 4);
        b.set(9, 19, 1);
        let before = b.clone();
        assert_eq!(b.clear_full_rows(), 0);
        assert_eq!(b, before);
    }
}
