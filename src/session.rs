//! Game session: owns the fixed-step scheduling loop for one mounted engine.
//!
//! Each frame the host calls [`GameSession::advance`] with the current instant.
//! Elapsed time is added to an accumulator and one simulation step is taken per
//! whole tick interval, so the simulation rate does not depend on the frame rate.
//! Pausing, focus loss and countdowns reset the clock instead of letting it
//! fast-forward through missed ticks.

use std::time::{Duration, Instant};

/// Shortest interval a simulation may request; guards the step loop.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// An engine driven by a [`GameSession`].
pub trait Simulation {
    /// Current interval between steps. Re-read before every step.
    fn tick_interval(&self) -> Duration;
    /// True while steps should be applied (running, not paused, not terminal).
    fn is_running(&self) -> bool;
    /// One discrete simulation step.
    fn step(&mut self);
    /// Suspends or resumes the engine without resetting it.
    fn set_paused(&mut self, paused: bool);
}

/// Monotonic clock with an accumulator of not-yet-simulated time.
#[derive(Debug, Clone, Default)]
pub struct TickClock {
    last: Option<Instant>,
    acc: Duration,
}

impl TickClock {
    /// Forgets the last sample and any accumulated time.
    pub fn reset(&mut self) {
        self.last = None;
        self.acc = Duration::ZERO;
    }

    /// Time since the previous sample; zero on the first sample after a reset.
    pub fn sample(&mut self, now: Instant) -> Duration {
        let dt = self
            .last
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last = Some(now);
        dt
    }

    pub fn accumulate(&mut self, dt: Duration) {
        self.acc += dt;
    }

    /// Consumes one interval from the accumulator if enough time has built up.
    pub fn consume(&mut self, interval: Duration) -> bool {
        if self.acc >= interval {
            self.acc -= interval;
            true
        } else {
            false
        }
    }
}

/// Visible countdown shown before play resumes (3, 2, 1).
#[derive(Debug, Clone)]
pub struct Countdown {
    remaining: u8,
    step: Duration,
    elapsed: Duration,
}

impl Countdown {
    pub fn new(steps: u8, step: Duration) -> Self {
        Self {
            remaining: steps,
            step,
            elapsed: Duration::ZERO,
        }
    }

    /// Number currently shown; 0 once finished.
    pub fn remaining(&self) -> u8 {
        self.remaining
    }

    /// Advances by `dt`; returns true once the countdown has reached zero.
    pub fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed += dt;
        while self.remaining > 0 && self.elapsed >= self.step {
            self.elapsed -= self.step;
            self.remaining -= 1;
        }
        self.remaining == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Nothing scheduled (idle, terminal, or torn down).
    Stopped,
    Scheduled,
    Suspended,
    CountingDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Advance {
    pub steps: u32,
    pub countdown_finished: bool,
    /// The engine left the running state during this advance.
    pub halted: bool,
}

#[derive(Debug)]
pub struct GameSession<S> {
    sim: S,
    clock: TickClock,
    state: LoopState,
    countdown: Option<Countdown>,
}

impl<S: Simulation> GameSession<S> {
    pub fn new(sim: S) -> Self {
        Self {
            sim,
            clock: TickClock::default(),
            state: LoopState::Stopped,
            countdown: None,
        }
    }

    pub fn sim(&self) -> &S {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut S {
        &mut self.sim
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn countdown(&self) -> Option<&Countdown> {
        self.countdown.as_ref()
    }

    /// Schedules the loop for a freshly started engine.
    pub fn start(&mut self) {
        self.clock.reset();
        self.countdown = None;
        self.state = LoopState::Scheduled;
    }

    pub fn pause(&mut self) {
        if self.state != LoopState::Scheduled {
            return;
        }
        self.sim.set_paused(true);
        self.clock.reset();
        self.state = LoopState::Suspended;
    }

    pub fn resume(&mut self) {
        if self.state != LoopState::Suspended {
            return;
        }
        self.sim.set_paused(false);
        self.clock.reset();
        self.state = LoopState::Scheduled;
    }

    /// Resumes once `countdown` has run out. The engine stays paused meanwhile.
    pub fn resume_after(&mut self, countdown: Countdown) {
        if self.state != LoopState::Suspended {
            return;
        }
        self.clock.reset();
        self.countdown = Some(countdown);
        self.state = LoopState::CountingDown;
    }

    /// Drops a pending countdown. The engine stays paused until resumed again.
    pub fn cancel_countdown(&mut self) {
        if self.state != LoopState::CountingDown {
            return;
        }
        self.clock.reset();
        self.countdown = None;
        self.state = LoopState::Suspended;
    }

    /// Cancels the loop and any pending countdown.
    pub fn stop(&mut self) {
        self.clock.reset();
        self.countdown = None;
        self.state = LoopState::Stopped;
    }

    /// Drops the clock backlog (focus regained, terminal stalled).
    pub fn suspend_clock(&mut self) {
        self.clock.reset();
    }

    /// Applies every step due at `now`.
    pub fn advance(&mut self, now: Instant) -> Advance {
        let dt = self.clock.sample(now);
        let mut out = Advance::default();
        match self.state {
            LoopState::Stopped | LoopState::Suspended => {}
            LoopState::CountingDown => {
                let finished = self.countdown.as_mut().is_none_or(|c| c.advance(dt));
                if finished {
                    self.countdown = None;
                    self.sim.set_paused(false);
                    self.clock.reset();
                    self.clock.sample(now);
                    self.state = LoopState::Scheduled;
                    out.countdown_finished = true;
                }
            }
            LoopState::Scheduled => {
                self.clock.accumulate(dt);
                loop {
                    if !self.sim.is_running() {
                        self.stop();
                        out.halted = true;
                        break;
                    }
                    let interval = self.sim.tick_interval().max(MIN_INTERVAL);
                    if !self.clock.consume(interval) {
                        break;
                    }
                    self.sim.step();
                    out.steps += 1;
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Counter {
        steps: u32,
        paused: bool,
        stop_after: Option<u32>,
    }

    impl Simulation for Counter {
        fn tick_interval(&self) -> Duration {
            Duration::from_millis(100)
        }

        fn is_running(&self) -> bool {
            !self.paused && self.stop_after.is_none_or(|n| self.steps < n)
        }

        fn step(&mut self) {
            self.steps += 1;
        }

        fn set_paused(&mut self, paused: bool) {
            self.paused = paused;
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_one_step_per_elapsed_interval() {
        let t0 = Instant::now();
        let mut s = GameSession::new(Counter::default());
        s.start();
        assert_eq!(s.advance(t0).steps, 0);
        assert_eq!(s.advance(t0 + ms(99)).steps, 0);
        assert_eq!(s.advance(t0 + ms(100)).steps, 1);
        // a long frame applies every missed interval
        assert_eq!(s.advance(t0 + ms(450)).steps, 3);
        assert_eq!(s.sim().steps, 4);
    }

    #[test]
    fn test_pause_discards_backlog() {
        let t0 = Instant::now();
        let mut s = GameSession::new(Counter::default());
        s.start();
        s.advance(t0);
        s.advance(t0 + ms(150));
        s.pause();
        assert_eq!(s.advance(t0 + ms(5_000)).steps, 0);
        s.resume();
        assert_eq!(s.advance(t0 + ms(10_000)).steps, 0);
        assert_eq!(s.advance(t0 + ms(10_100)).steps, 1);
        assert_eq!(s.sim().steps, 2);
    }

    #[test]
    fn test_suspend_clock_prevents_fast_forward() {
        let t0 = Instant::now();
        let mut s = GameSession::new(Counter::default());
        s.start();
        s.advance(t0);
        s.suspend_clock();
        assert_eq!(s.advance(t0 + ms(60_000)).steps, 0);
        assert_eq!(s.sim().steps, 0);
    }

    #[test]
    fn test_countdown_before_resume() {
        let t0 = Instant::now();
        let mut s = GameSession::new(Counter::default());
        s.start();
        s.advance(t0);
        s.pause();
        assert!(s.sim().paused);
        s.resume_after(Countdown::new(3, ms(1_000)));
        assert_eq!(s.state(), LoopState::CountingDown);
        s.advance(t0 + ms(10));
        let a = s.advance(t0 + ms(1_500));
        assert!(!a.countdown_finished);
        assert_eq!(s.countdown().map(Countdown::remaining), Some(2));
        let a = s.advance(t0 + ms(3_100));
        assert!(a.countdown_finished);
        assert!(!s.sim().paused);
        assert_eq!(s.state(), LoopState::Scheduled);
        // no steps were owed for the countdown period
        assert_eq!(s.advance(t0 + ms(3_150)).steps, 0);
        assert_eq!(s.advance(t0 + ms(3_200)).steps, 1);
    }

    #[test]
    fn test_stop_cancels_countdown() {
        let mut s = GameSession::new(Counter::default());
        s.start();
        s.pause();
        s.resume_after(Countdown::new(3, ms(1_000)));
        s.stop();
        assert!(s.countdown().is_none());
        assert_eq!(s.state(), LoopState::Stopped);
        assert_eq!(s.advance(Instant::now()).steps, 0);
    }

    #[test]
    fn test_cancel_countdown_keeps_engine_paused() {
        let t0 = Instant::now();
        let mut s = GameSession::new(Counter::default());
        s.start();
        s.pause();
        s.resume_after(Countdown::new(3, ms(1_000)));
        s.advance(t0);
        s.cancel_countdown();
        assert!(s.countdown().is_none());
        assert_eq!(s.state(), LoopState::Suspended);
        let a = s.advance(t0 + ms(5_000));
        assert_eq!(a.steps, 0);
        assert!(!a.countdown_finished);
        assert!(s.sim().paused);
        // a second countdown can still be started
        s.resume_after(Countdown::new(1, ms(1_000)));
        assert_eq!(s.state(), LoopState::CountingDown);
    }

    #[test]
    fn test_halts_when_engine_stops_running() {
        let t0 = Instant::now();
        let mut s = GameSession::new(Counter {
            stop_after: Some(2),
            ..Counter::default()
        });
        s.start();
        s.advance(t0);
        let a = s.advance(t0 + ms(1_000));
        assert_eq!(a.steps, 2);
        assert!(a.halted);
        assert_eq!(s.state(), LoopState::Stopped);
    }

    #[test]
    fn test_countdown_counts_down() {
        let mut c = Countdown::new(3, ms(1_000));
        assert_eq!(c.remaining(), 3);
        assert!(!c.advance(ms(999)));
        assert!(!c.advance(ms(1)));
        assert_eq!(c.remaining(), 2);
        assert!(c.advance(ms(2_000)));
        assert_eq!(c.remaining(), 0);
    }
}
