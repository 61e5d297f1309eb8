//! Tetris: piece catalog, persistent board and the falling-piece engine.

pub mod board;
pub mod engine;
pub mod pieces;

pub use board::{Board, COLS, ROWS};
pub use engine::{ActivePiece, LockReport, MoveOutcome, RotationDirection, TetrisEngine, TetrisStatus};
pub use pieces::TetrominoKind;
