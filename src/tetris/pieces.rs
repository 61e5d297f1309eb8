//! Tetromino catalog: seven shapes, four precomputed 4×4 rotations each.

use crate::rng::RandomSource;

/// One rotation of a piece, row-major; non-zero marks an occupied cell.
pub type Bitmap = [[u8; 4]; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl TetrominoKind {
    pub const ALL: [Self; 7] = [Self::I, Self::O, Self::T, Self::S, Self::Z, Self::J, Self::L];

    /// Cell value written into the board when the piece locks (1..=7).
    pub const fn id(self) -> u8 {
        match self {
            Self::I => 1,
            Self::O => 2,
            Self::T => 3,
            Self::S => 4,
            Self::Z => 5,
            Self::J => 6,
            Self::L => 7,
        }
    }

    pub fn random(rng: &mut impl RandomSource) -> Self {
        Self::ALL[rng.below(Self::ALL.len())]
    }

    /// Bitmap for `rotation`, taken modulo 4.
    pub fn rotation(self, rotation: u8) -> &'static Bitmap {
        &ROTATIONS[self as usize][usize::from(rotation % 4)]
    }
}

/// Occupied `(col, row)` offsets of a bitmap.
pub fn cells(bitmap: &Bitmap) -> impl Iterator<Item = (i32, i32)> + '_ {
    bitmap.iter().enumerate().flat_map(|(r, row)| {
        row.iter()
            .enumerate()
            .filter(|&(_, &v)| v != 0)
            .map(move |(c, _)| (c as i32, r as i32))
    })
}

const O_SHAPE: Bitmap = [[0, 0, 0, 0], [0, 1, 1, 0], [0, 1, 1, 0], [0, 0, 0, 0]];

// Indexed by `TetrominoKind as usize`.
const ROTATIONS: [[Bitmap; 4]; 7] = [
    // I
    [
        [[0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]],
        [[0, 0, 1, 0], [0, 0, 1, 0], [0, 0, 1, 0], [0, 0, 1, 0]],
        [[0, 0, 0, 0], [0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0]],
        [[0, 1, 0, 0], [0, 1, 0, 0], [0, 1, 0, 0], [0, 1, 0, 0]],
    ],
    // O
    [O_SHAPE, O_SHAPE, O_SHAPE, O_SHAPE],
    // T
    [
        [[0, 0, 0, 0], [1, 1, 1, 0], [0, 1, 0, 0], [0, 0, 0, 0]],
        [[0, 1, 0, 0], [1, 1, 0, 0], [0, 1, 0, 0], [0, 0, 0, 0]],
        [[0, 1, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
        [[0, 1, 0, 0], [0, 1, 1, 0], [0, 1, 0, 0], [0, 0, 0, 0]],
    ],
    // S
    [
        [[0, 0, 0, 0], [0, 1, 1, 0], [1, 1, 0, 0], [0, 0, 0, 0]],
        [[1, 0, 0, 0], [1, 1, 0, 0], [0, 1, 0, 0], [0, 0, 0, 0]],
        [[0, 0, 0, 0], [0, 1, 1, 0], [1, 1, 0, 0], [0, 0, 0, 0]],
        [[1, 0, 0, 0], [1, 1, 0, 0], [0, 1, 0, 0], [0, 0, 0, 0]],
    ],
    // Z
    [
        [[0, 0, 0, 0], [1, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0]],
        [[0, 1, 0, 0], [1, 1, 0, 0], [1, 0, 0, 0], [0, 0, 0, 0]],
        [[0, 0, 0, 0], [1, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0]],
        [[0, 1, 0, 0], [1, 1, 0, 0], [1, 0, 0, 0], [0, 0, 0, 0]],
    ],
    // J
    [
        [[0, 0, 0, 0], [1, 1, 1, 0], [0, 0, 1, 0], [0, 0, 0, 0]],
        [[0, 1, 0, 0], [0, 1, 0, 0], [1, 1, 0, 0], [0, 0, 0, 0]],
        [[1, 0, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
        [[0, 1, 1, 0], [0, 1, 0, 0], [0, 1, 0, 0], [0, 0, 0, 0]],
    ],
    // L
    [
        [[0, 0, 0, 0], [1, 1, 1, 0], [1, 0, 0, 0], [0, 0, 0, 0]],
        [[1, 1, 0, 0], [0, 1, 0, 0], [0, 1, 0, 0], [0, 0, 0, 0]],
        [[0, 0, 1, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
        [[0, 1, 0, 0], [0, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0]],
    ],
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::testing::Scripted;

    #[test]
    fn test_every_rotation_has_four_cells() {
        for kind in TetrominoKind::ALL {
            for rot in 0..4 {
                assert_eq!(cells(kind.rotation(rot)).count(), 4, "{kind:?} rot {rot}");
            }
        }
    }

    #[test]
    fn test_ids_are_one_through_seven() {
        let ids: Vec<u8> = TetrominoKind::ALL.iter().map(|k| k.id()).collect();
        assert_eq!(ids, (1..=7).collect::<Vec<u8>>());
    }

    #[test]
    fn test_rotation_index_wraps() {
        assert_eq!(TetrominoKind::T.rotation(5), TetrominoKind::T.rotation(1));
    }

    #[test]
    fn test_random_uses_source() {
        let mut rng = Scripted::new([0, 6, 5]);
        assert_eq!(TetrominoKind::random(&mut rng), TetrominoKind::I);
        assert_eq!(TetrominoKind::random(&mut rng), TetrominoKind::L);
        assert_eq!(TetrominoKind::random(&mut rng), TetrominoKind::J);
    }

    #[test]
    fn test_cells_offsets() {
        let got: Vec<_> = cells(TetrominoKind::I.rotation(3)).collect();
        assert_eq!(got, vec![(1, 0), (1, 1), (1, 2), (1, 3)]);
    }
}
