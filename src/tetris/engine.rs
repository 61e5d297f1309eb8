//! Falling-piece simulation: movement, wall kicks, locking, scoring and the
//! level speed curve.

use super::board::Board;
use super::pieces::{self, Bitmap, TetrominoKind};
use crate::grid::Point;
use crate::rng::RandomSource;
use crate::session::Simulation;
use std::time::Duration;

/// Where new pieces appear: column 3, one row above the well.
pub const SPAWN_ORIGIN: Point = Point::new(3, -1);
/// Base score by lines cleared in one lock, multiplied by `level + 1`.
pub const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];
pub const SOFT_DROP_BONUS: u32 = 1;
pub const HARD_DROP_BONUS: u32 = 2;
pub const LINES_PER_LEVEL: u32 = 10;

const BASE_GRAVITY_MS: f64 = 800.0;
const GRAVITY_DECAY: f64 = 0.86;
const MIN_GRAVITY_MS: u64 = 120;
const SOFT_DROP_FACTOR: f64 = 0.08;
const MIN_SOFT_DROP_MS: u64 = 40;
/// Column offsets tried in order when a rotation collides.
const KICKS: [i32; 5] = [0, -1, 1, -2, 2];

/// Gravity interval for `level`: 800 ms shrinking by 0.86 per level, floored
/// at 120 ms.
pub fn gravity_interval(level: u32) -> Duration {
    let ms = (BASE_GRAVITY_MS * GRAVITY_DECAY.powi(level.min(i32::MAX as u32) as i32)).floor();
    Duration::from_millis((ms as u64).max(MIN_GRAVITY_MS))
}

/// Interval used while soft drop is held.
pub fn soft_drop_interval(gravity: Duration) -> Duration {
    let ms = (gravity.as_millis() as f64 * SOFT_DROP_FACTOR).floor() as u64;
    Duration::from_millis(ms.max(MIN_SOFT_DROP_MS))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePiece {
    pub kind: TetrominoKind,
    pub rotation: u8,
    pub origin: Point,
}

impl ActivePiece {
    pub const fn spawn(kind: TetrominoKind) -> Self {
        Self {
            kind,
            rotation: 0,
            origin: SPAWN_ORIGIN,
        }
    }

    pub fn bitmap(&self) -> &'static Bitmap {
        self.kind.rotation(self.rotation)
    }

    /// Board cells covered by the piece, including any above the well.
    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        let origin = self.origin;
        pieces::cells(self.bitmap()).map(move |(c, r)| origin.offset(c, r))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TetrisStatus {
    Idle,
    Running,
    Paused,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

impl RotationDirection {
    const fn step(self) -> u8 {
        match self {
            Self::Clockwise => 1,
            Self::CounterClockwise => 3,
        }
    }
}

/// Result of merging a piece into the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockReport {
    pub cleared: usize,
    pub awarded: u32,
    pub level_up: bool,
    /// The next piece could not spawn.
    pub game_over: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Not running; nothing changed.
    Ignored,
    Moved,
    Blocked,
    Locked(LockReport),
}

#[derive(Debug)]
pub struct TetrisEngine<R = fastrand::Rng> {
    board: Board,
    piece: ActivePiece,
    score: u32,
    lines: u32,
    level: u32,
    gravity: Duration,
    soft_drop: bool,
    status: TetrisStatus,
    rng: R,
}

impl<R: RandomSource> TetrisEngine<R> {
    pub fn new(mut rng: R) -> Self {
        let piece = ActivePiece::spawn(TetrominoKind::random(&mut rng));
        Self {
            board: Board::new(),
            piece,
            score: 0,
            lines: 0,
            level: 0,
            gravity: gravity_interval(0),
            soft_drop: false,
            status: TetrisStatus::Idle,
            rng,
        }
    }

    /// Clears the well and counters and starts a new game.
    pub fn reset(&mut self) {
        self.board = Board::new();
        self.score = 0;
        self.lines = 0;
        self.level = 0;
        self.gravity = gravity_interval(0);
        self.soft_drop = false;
        self.piece = ActivePiece::spawn(TetrominoKind::random(&mut self.rng));
        self.status = TetrisStatus::Running;
    }

    fn active(&self) -> bool {
        self.status == TetrisStatus::Running
    }

    /// Shifts the piece by (`dx`, `dy`). A blocked downward step locks the
    /// piece. `grant` awards the soft-drop bonus for a successful downward step.
    pub fn try_move(&mut self, dx: i32, dy: i32, grant: bool) -> MoveOutcome {
        if !self.active() {
            return MoveOutcome::Ignored;
        }
        let next = self.piece.origin.offset(dx, dy);
        if !self.board.collides(self.piece.bitmap(), next) {
            self.piece.origin = next;
            if grant && dy > 0 {
                self.score += SOFT_DROP_BONUS;
            }
            return MoveOutcome::Moved;
        }
        if dy == 1 {
            return MoveOutcome::Locked(self.lock());
        }
        MoveOutcome::Blocked
    }

    /// Immediate one-row drop when soft drop is first pressed.
    pub fn soft_drop_nudge(&mut self) -> MoveOutcome {
        self.try_move(0, 1, true)
    }

    /// Rotates with kicks; returns false when every candidate collides.
    pub fn try_rotate(&mut self, dir: RotationDirection) -> bool {
        if !self.active() {
            return false;
        }
        let rotation = (self.piece.rotation + dir.step()) % 4;
        let bitmap = self.piece.kind.rotation(rotation);
        let origin = self.piece.origin;
        let Some(kicked) = KICKS
            .iter()
            .map(|&k| origin.offset(k, 0))
            .find(|&p| !self.board.collides(bitmap, p))
        else {
            return false;
        };
        self.piece.rotation = rotation;
        self.piece.origin = kicked;
        true
    }

    /// Row the piece would rest on if dropped straight down.
    pub fn ghost_origin(&self) -> Point {
        let bitmap = self.piece.bitmap();
        let mut origin = self.piece.origin;
        while !self.board.collides(bitmap, origin.offset(0, 1)) {
            origin = origin.offset(0, 1);
        }
        origin
    }

    /// Drops to the ghost position, awards the hard-drop bonus per row and locks.
    pub fn hard_drop(&mut self) -> Option<LockReport> {
        if !self.active() {
            return None;
        }
        let target = self.ghost_origin();
        let rows = (target.y - self.piece.origin.y).max(0) as u32;
        self.score += rows * HARD_DROP_BONUS;
        self.piece.origin = target;
        Some(self.lock())
    }

    fn lock(&mut self) -> LockReport {
        self.board
            .merge(self.piece.bitmap(), self.piece.origin, self.piece.kind.id());
        let cleared = self.board.clear_full_rows();
        let mut report = LockReport {
            cleared,
            ..LockReport::default()
        };
        if cleared > 0 {
            report.awarded = LINE_SCORES[cleared.min(4)] * (self.level + 1);
            self.score += report.awarded;
            self.lines += cleared as u32;
            let level = self.lines / LINES_PER_LEVEL;
            if level != self.level {
                self.level = level;
                self.gravity = gravity_interval(level);
                report.level_up = true;
            }
        }
        self.piece = ActivePiece::spawn(TetrominoKind::random(&mut self.rng));
        if self.board.collides(self.piece.bitmap(), self.piece.origin) {
            self.status = TetrisStatus::GameOver;
            self.soft_drop = false;
            report.game_over = true;
        }
        report
    }

    /// One gravity step; grants the soft-drop bonus while the drop is held.
    pub fn gravity_step(&mut self) -> MoveOutcome {
        self.try_move(0, 1, self.soft_drop)
    }

    /// Flips between running and paused. Returns false in any other state.
    pub fn toggle_pause(&mut self) -> bool {
        self.status = match self.status {
            TetrisStatus::Running => TetrisStatus::Paused,
            TetrisStatus::Paused => TetrisStatus::Running,
            _ => return false,
        };
        true
    }

    pub fn set_soft_drop(&mut self, held: bool) {
        self.soft_drop = held;
    }

    pub fn soft_drop_held(&self) -> bool {
        self.soft_drop
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn piece(&self) -> &ActivePiece {
        &self.piece
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn status(&self) -> TetrisStatus {
        self.status
    }
}

impl<R: RandomSource> Simulation for TetrisEngine<R> {
    fn tick_interval(&self) -> Duration {
        if self.soft_drop {
            soft_drop_interval(self.gravity)
        } else {
            self.gravity
        }
    }

    fn is_running(&self) -> bool {
        self.status == TetrisStatus::Running
    }

    fn step(&mut self) {
        self.gravity_step();
    }

    fn set_paused(&mut self, paused: bool) {
        let is_paused = self.status == TetrisStatus::Paused;
        if paused != is_paused {
            self.toggle_pause();
        }
    }
}
