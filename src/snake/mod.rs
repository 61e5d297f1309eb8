//! Snake engine: body-as-queue simulation on a wrapping grid.

pub mod card;

use crate::grid::Point;
use crate::rng::RandomSource;
use crate::session::Simulation;
use std::collections::VecDeque;
use std::time::Duration;

/// Grid is GRID × GRID cells.
pub const GRID: i32 = 18;
/// Food eaten to win.
pub const WIN_SCORE: u32 = 20;
/// Default interval between ticks.
pub const TICK: Duration = Duration::from_millis(95);
/// Tick stretch applied when reduced motion is requested.
pub const REDUCED_MOTION_FACTOR: f64 = 1.4;

const START: Point = Point::new(5, 9);
const IDLE_FOOD: Point = Point::new(12, 9);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const fn vector(self) -> Point {
        match self {
            Self::Up => Point::new(0, -1),
            Self::Down => Point::new(0, 1),
            Self::Left => Point::new(-1, 0),
            Self::Right => Point::new(1, 0),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakeStatus {
    Idle,
    Running,
    Paused,
    GameOver,
    Won,
}

impl SnakeStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver | Self::Won)
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing happened.
    Ignored,
    Moved,
    Ate,
    Collided,
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnakeSettings {
    pub tick: Duration,
}

impl SnakeSettings {
    pub fn new(tick: Duration, reduced_motion: bool) -> Self {
        let tick = if reduced_motion {
            tick.mul_f64(REDUCED_MOTION_FACTOR)
        } else {
            tick
        };
        Self { tick }
    }
}

impl Default for SnakeSettings {
    fn default() -> Self {
        Self { tick: TICK }
    }
}

/// Board state captured for the collector card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnakeSnapshot {
    pub cols: i32,
    pub rows: i32,
    pub body: Vec<Point>,
    pub food: Point,
}

#[derive(Debug)]
pub struct SnakeEngine<R = fastrand::Rng> {
    body: VecDeque<Point>,
    food: Point,
    heading: Direction,
    pending: Direction,
    score: u32,
    status: SnakeStatus,
    settings: SnakeSettings,
    rng: R,
}

impl<R: RandomSource> SnakeEngine<R> {
    pub fn new(settings: SnakeSettings, rng: R) -> Self {
        Self {
            body: VecDeque::from([START]),
            food: IDLE_FOOD,
            heading: Direction::Right,
            pending: Direction::Right,
            score: 0,
            status: SnakeStatus::Idle,
            settings,
            rng,
        }
    }

    pub fn start(&mut self) {
        self.body.clear();
        self.body.push_back(START);
        self.heading = Direction::Right;
        self.pending = Direction::Right;
        self.score = 0;
        self.spawn_food();
        self.status = SnakeStatus::Running;
    }

    pub fn restart(&mut self) {
        self.start();
    }

    /// Leaves a finished game for the idle title screen.
    pub fn reset_to_idle(&mut self) {
        if self.status.is_terminal() {
            self.status = SnakeStatus::Idle;
        }
    }

    /// Buffers `dir` for the next tick. Reversals are ignored; a later call
    /// before the tick overwrites an earlier one.
    pub fn set_direction(&mut self, dir: Direction) {
        if self.status != SnakeStatus::Running || dir == self.heading.opposite() {
            return;
        }
        self.pending = dir;
    }

    pub fn pause(&mut self) {
        if self.status == SnakeStatus::Running {
            self.status = SnakeStatus::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.status == SnakeStatus::Paused {
            self.status = SnakeStatus::Running;
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.status != SnakeStatus::Running {
            return TickOutcome::Ignored;
        }
        if self.pending != self.heading.opposite() {
            self.heading = self.pending;
        }
        let head = (self.head() + self.heading.vector()).wrapped(GRID, GRID);
        if self.body.contains(&head) {
            self.status = SnakeStatus::GameOver;
            return TickOutcome::Collided;
        }
        self.body.push_front(head);
        if head != self.food {
            self.body.pop_back();
            return TickOutcome::Moved;
        }
        self.spawn_food();
        self.score += 1;
        if self.score >= WIN_SCORE {
            self.status = SnakeStatus::Won;
            return TickOutcome::Won;
        }
        TickOutcome::Ate
    }

    /// Rejection-samples a free cell, falling back to a scan when the
    /// sampler keeps landing on the body.
    fn spawn_food(&mut self) {
        let cells = (GRID * GRID) as usize;
        for _ in 0..cells * 4 {
            let candidate = Point::new(
                self.rng.below(GRID as usize) as i32,
                self.rng.below(GRID as usize) as i32,
            );
            if !self.body.contains(&candidate) {
                self.food = candidate;
                return;
            }
        }
        let free = (0..GRID)
            .flat_map(|y| (0..GRID).map(move |x| Point::new(x, y)))
            .find(|p| !self.body.contains(p));
        if let Some(p) = free {
            self.food = p;
        }
    }

    pub fn head(&self) -> Point {
        self.body.front().copied().unwrap_or(START)
    }

    pub fn body(&self) -> &VecDeque<Point> {
        &self.body
    }

    pub fn food(&self) -> Point {
        self.food
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn status(&self) -> SnakeStatus {
        self.status
    }

    pub fn snapshot(&self) -> SnakeSnapshot {
        SnakeSnapshot {
            cols: GRID,
            rows: GRID,
            body: self.body.iter().copied().collect(),
            food: self.food,
        }
    }
}

impl<R: RandomSource> Simulation for SnakeEngine<R> {
    fn tick_interval(&self) -> Duration {
        self.settings.tick
    }

    fn is_running(&self) -> bool {
        self.status == SnakeStatus::Running
    }

    fn step(&mut self) {
        self.tick();
    }

    fn set_paused(&mut self, paused: bool) {
        if paused {
            self.pause();
        } else {
            self.resume();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::testing::Scripted;

    /// Engine whose food spawns replay `foods` in order.
    fn engine_with_foods(foods: &[Point]) -> SnakeEngine<Scripted> {
        let values = foods
            .iter()
            .flat_map(|p| [p.x as usize, p.y as usize])
            .collect::<Vec<_>>();
        SnakeEngine::new(SnakeSettings::default(), Scripted::new(values))
    }

    #[test]
    fn test_start_state() {
        let mut e = engine_with_foods(&[Point::new(0, 0)]);
        assert_eq!(e.status(), SnakeStatus::Idle);
        e.start();
        assert_eq!(e.status(), SnakeStatus::Running);
        assert_eq!(e.body().len(), 1);
        assert_eq!(e.head(), Point::new(5, 9));
        assert_eq!(e.heading(), Direction::Right);
        assert_eq!(e.food(), Point::new(0, 0));
        assert_eq!(e.score(), 0);
    }

    #[test]
    fn test_food_never_spawns_on_body() {
        // first sample lands on the start cell and must be rejected
        let mut e = engine_with_foods(&[Point::new(5, 9), Point::new(7, 2)]);
        e.start();
        assert_eq!(e.food(), Point::new(7, 2));
    }

    #[test]
    fn test_wraps_at_every_edge() {
        let mut e = engine_with_foods(&[Point::new(10, 3)]);
        e.start();
        for _ in 0..13 {
            e.tick();
        }
        assert_eq!(e.head(), Point::new(0, 9));
        e.set_direction(Direction::Up);
        for _ in 0..10 {
            let before = e.head();
            e.tick();
            assert_eq!(
                e.head(),
                (before + Direction::Up.vector()).wrapped(GRID, GRID)
            );
        }
        assert_eq!(e.head(), Point::new(0, 17));
        e.set_direction(Direction::Left);
        e.tick();
        assert_eq!(e.head(), Point::new(17, 17));
        e.set_direction(Direction::Down);
        e.tick();
        assert_eq!(e.head(), Point::new(17, 0));
        assert_eq!(e.status(), SnakeStatus::Running);
    }

    #[test]
    fn test_reverse_direction_is_ignored() {
        let mut e = engine_with_foods(&[Point::new(0, 0)]);
        e.start();
        e.set_direction(Direction::Left);
        e.tick();
        assert_eq!(e.heading(), Direction::Right);
        assert_eq!(e.head(), Point::new(6, 9));
    }

    #[test]
    fn test_only_latest_direction_before_tick_counts() {
        let mut e = engine_with_foods(&[Point::new(0, 0)]);
        e.start();
        e.set_direction(Direction::Up);
        e.set_direction(Direction::Down);
        e.tick();
        assert_eq!(e.heading(), Direction::Down);
        assert_eq!(e.head(), Point::new(5, 10));
    }

    #[test]
    fn test_quick_double_turn_cannot_reverse() {
        let mut e = engine_with_foods(&[Point::new(0, 0)]);
        e.start();
        // heading right: up is buffered, then left is checked against the
        // current heading (right) and rejected
        e.set_direction(Direction::Up);
        e.set_direction(Direction::Left);
        e.tick();
        assert_eq!(e.heading(), Direction::Up);
    }

    #[test]
    fn test_eating_grows_and_scores() {
        let mut e = engine_with_foods(&[Point::new(6, 9), Point::new(0, 0)]);
        e.start();
        assert_eq!(e.tick(), TickOutcome::Ate);
        assert_eq!(e.body().len(), 2);
        assert_eq!(e.score(), 1);
        assert_eq!(e.food(), Point::new(0, 0));
        assert_eq!(e.tick(), TickOutcome::Moved);
        assert_eq!(e.body().len(), 2);
    }

    #[test]
    fn test_growth_law() {
        let foods = [
            Point::new(7, 9),
            Point::new(9, 9),
            Point::new(12, 9),
            Point::new(0, 0),
        ];
        let mut e = engine_with_foods(&foods);
        e.start();
        let mut eaten = 0;
        for _ in 0..10 {
            if e.tick() == TickOutcome::Ate {
                eaten += 1;
            }
            assert_eq!(e.body().len(), 1 + eaten);
        }
        assert_eq!(eaten, 3);
    }

    #[test]
    fn test_self_collision_ends_game() {
        let mut foods: Vec<Point> = (6..=9).map(|x| Point::new(x, 9)).collect();
        foods.push(Point::new(0, 0));
        let mut e = engine_with_foods(&foods);
        e.start();
        for _ in 0..4 {
            assert_eq!(e.tick(), TickOutcome::Ate);
        }
        // body of five: turn back onto itself
        e.set_direction(Direction::Down);
        e.tick();
        e.set_direction(Direction::Left);
        e.tick();
        e.set_direction(Direction::Up);
        assert_eq!(e.tick(), TickOutcome::Collided);
        assert_eq!(e.status(), SnakeStatus::GameOver);
        assert_eq!(e.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn test_win_after_twenty_foods() {
        // ten cells to the right, then ten cells down (wrapping at the bottom)
        let mut path: Vec<Point> = (6..=15).map(|x| Point::new(x, 9)).collect();
        path.extend((10..20).map(|y| Point::new(15, y % GRID)));
        let mut foods = path.clone();
        foods.push(Point::new(0, 0));
        let mut e = engine_with_foods(&foods);
        e.start();
        for (i, _) in path.iter().enumerate() {
            if i == 10 {
                e.set_direction(Direction::Down);
            }
            let outcome = e.tick();
            if i < 19 {
                assert_eq!(outcome, TickOutcome::Ate);
            } else {
                assert_eq!(outcome, TickOutcome::Won);
            }
        }
        assert_eq!(e.score(), 20);
        assert_eq!(e.status(), SnakeStatus::Won);
        assert_eq!(e.body().len(), 21);
        assert!(!e.is_running());
        e.reset_to_idle();
        assert_eq!(e.status(), SnakeStatus::Idle);
    }

    #[test]
    fn test_pause_blocks_ticks_and_input() {
        let mut e = engine_with_foods(&[Point::new(0, 0)]);
        e.start();
        e.pause();
        assert_eq!(e.tick(), TickOutcome::Ignored);
        e.set_direction(Direction::Up);
        e.resume();
        e.tick();
        assert_eq!(e.heading(), Direction::Right);
    }

    #[test]
    fn test_restart_discards_state() {
        let mut scripted = Scripted::new([6, 9]);
        scripted.push(1);
        scripted.push(1);
        let mut e = SnakeEngine::new(SnakeSettings::default(), scripted);
        e.start();
        e.tick();
        assert_eq!(e.score(), 1);
        e.restart();
        assert_eq!(e.score(), 0);
        assert_eq!(e.body().len(), 1);
        assert_eq!(e.status(), SnakeStatus::Running);
    }

    #[test]
    fn test_no_reversal_random_sequences() {
        let mut e = SnakeEngine::new(SnakeSettings::default(), fastrand::Rng::with_seed(11));
        let mut input = fastrand::Rng::with_seed(3);
        let dirs = [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ];
        e.start();
        for _ in 0..500 {
            if e.status().is_terminal() {
                e.start();
            }
            let before = e.heading();
            let d = dirs[input.usize(..4)];
            e.set_direction(d);
            let old_head = e.head();
            if e.tick() == TickOutcome::Collided {
                continue;
            }
            if d == before.opposite() {
                assert_eq!(e.heading(), before);
            }
            assert_eq!(e.head(), (old_head + e.heading().vector()).wrapped(GRID, GRID));
            assert!(!e.body().contains(&e.food()) || e.status() == SnakeStatus::Won);
        }
    }

    #[test]
    fn test_reduced_motion_stretches_tick() {
        let s = SnakeSettings::new(Duration::from_millis(100), true);
        assert_eq!(s.tick, Duration::from_millis(140));
    }
}
