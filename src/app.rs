//! App: terminal init, main loop, game mounting and key handling.

use crate::config::{ArcadeConfig, GameKind};
use crate::effects::{BoardFade, Confetti};
use crate::input::{SnakeAction, TetrisAction, snake_action, tetris_action};
use crate::rng;
use crate::session::{Countdown, GameSession, LoopState};
use crate::snake::{SnakeEngine, SnakeSettings, SnakeStatus, card};
use crate::tetris::{LockReport, MoveOutcome, RotationDirection, TetrisEngine, TetrisStatus};
use crate::theme::Theme;
use crate::ui;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent};
use log::{debug, info, trace, warn};
use ratatui::DefaultTerminal;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Steps and step length of the countdown shown before Snake resumes.
const RESUME_COUNTDOWN_STEPS: u8 = 3;
const RESUME_COUNTDOWN_STEP: Duration = Duration::from_secs(1);
/// Without key release events a soft drop ends when no press or auto-repeat
/// arrived for this long. Covers the usual delay before the first repeat.
const SOFT_DROP_HOLD_TIMEOUT: Duration = Duration::from_millis(550);

/// The single mounted game. Switching builds a fresh instance.
#[derive(Debug)]
pub enum Mounted {
    Snake(GameSession<SnakeEngine>),
    Tetris(GameSession<TetrisEngine>),
}

impl Mounted {
    pub const fn kind(&self) -> GameKind {
        match self {
            Self::Snake(_) => GameKind::Snake,
            Self::Tetris(_) => GameKind::Tetris,
        }
    }

    fn phase(&self) -> Phase {
        match self {
            Self::Snake(s) => match s.sim().status() {
                SnakeStatus::Idle => Phase::Idle,
                SnakeStatus::Running => Phase::Running,
                SnakeStatus::Paused => Phase::Paused,
                SnakeStatus::GameOver => Phase::Over,
                SnakeStatus::Won => Phase::Won,
            },
            Self::Tetris(s) => match s.sim().status() {
                TetrisStatus::Idle => Phase::Idle,
                TetrisStatus::Running => Phase::Running,
                TetrisStatus::Paused => Phase::Paused,
                TetrisStatus::GameOver => Phase::Over,
            },
        }
    }

    fn score(&self) -> u32 {
        match self {
            Self::Snake(s) => s.sim().score(),
            Self::Tetris(s) => s.sim().score(),
        }
    }
}

/// Engine-independent lifecycle, used to react to transitions once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Paused,
    Over,
    Won,
}

/// Outcome of writing the collector card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardStatus {
    Saved(PathBuf),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct App {
    config: ArcadeConfig,
    theme: Theme,
    seed: Option<u64>,
    game: Mounted,
    phase: Phase,
    fx_rng: fastrand::Rng,
    confetti: Option<Confetti>,
    fade: BoardFade,
    card: Option<CardStatus>,
    /// The terminal reports key releases (keyboard enhancement available).
    release_events: bool,
    soft_drop_deadline: Option<Instant>,
    focused: bool,
    last_update: Option<Instant>,
}

impl App {
    pub fn new(config: ArcadeConfig, theme: Theme, seed: Option<u64>) -> Self {
        let game = mount(config.starting_game, &config, seed);
        Self {
            phase: game.phase(),
            game,
            config,
            theme,
            seed,
            fx_rng: rng::seeded(seed),
            confetti: None,
            fade: BoardFade::default(),
            card: None,
            release_events: false,
            soft_drop_deadline: None,
            focused: true,
            last_update: None,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{
                DisableFocusChange, EnableFocusChange, KeyboardEnhancementFlags,
                PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
            },
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
                supports_keyboard_enhancement,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;

        // Release events drive the soft-drop hold when the terminal supports them
        self.release_events = supports_keyboard_enhancement().unwrap_or(false)
            && execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .is_ok();
        info!(
            "key release events {}",
            if self.release_events { "enabled" } else { "unavailable, using hold timeout" }
        );

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;
        info!("mounted {}", self.game.kind().label());

        let result = self.run_loop(&mut terminal);

        // Restore
        if self.release_events {
            let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        }
        let _ = terminal.show_cursor();
        execute!(std::io::stdout(), DisableFocusChange, LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.config.frame_rate());
        loop {
            let now = Instant::now();
            self.update(now);

            let hud = ui::Hud {
                card: self.card.as_ref(),
                confetti: self.confetti.as_ref(),
                reduced_motion: self.config.reduced_motion,
                focused: self.focused,
            };
            let drawn =
                terminal.draw(|f| ui::draw(f, &self.game, &self.theme, &hud, &mut self.fade, now));
            frame_drawn(drawn);

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if self.handle_event(event::read()?, Instant::now()) == Flow::Quit {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Advances the mounted session and the effects to `now`.
    fn update(&mut self, now: Instant) {
        let dt = self
            .last_update
            .map_or(Duration::ZERO, |t| now.saturating_duration_since(t));
        self.last_update = Some(now);

        if self.soft_drop_deadline.is_some_and(|d| now >= d) {
            self.release_soft_drop();
        }

        let advance = match &mut self.game {
            Mounted::Snake(s) => s.advance(now),
            Mounted::Tetris(s) => s.advance(now),
        };
        if advance.steps > 0 {
            trace!("{} steps", advance.steps);
        }
        if advance.countdown_finished {
            debug!("countdown finished, resuming");
        }
        if advance.halted {
            debug!("{}: loop stopped", self.game.kind().label());
        }

        if let Some(c) = &mut self.confetti {
            c.update(dt);
            if c.is_done() {
                self.confetti = None;
            }
        }
        self.observe_phase();
    }

    /// Reacts once to each lifecycle transition of the mounted game.
    fn observe_phase(&mut self) {
        let phase = self.game.phase();
        if phase == self.phase {
            return;
        }
        let kind = self.game.kind().label();
        match phase {
            Phase::Running if self.phase == Phase::Paused => debug!("{kind}: resumed"),
            Phase::Running => info!("{kind}: started"),
            Phase::Paused => debug!("{kind}: paused"),
            Phase::Over => {
                info!("{kind}: game over, score {}", self.game.score());
                self.release_soft_drop();
                self.fade.clear();
            }
            Phase::Won => {
                info!("{kind}: won, score {}", self.game.score());
                self.export_card();
                if !self.config.reduced_motion {
                    let confetti = Confetti::burst(&mut self.fx_rng);
                    debug!("confetti: {} particles", confetti.len());
                    self.confetti = Some(confetti);
                }
            }
            Phase::Idle => {}
        }
        self.phase = phase;
    }

    fn export_card(&mut self) {
        let Mounted::Snake(s) = &self.game else {
            return;
        };
        let engine = s.sim();
        let dir = self.config.card_dir();
        self.card = Some(
            match card::save(&dir, &self.config.player, engine.score(), &engine.snapshot()) {
                Ok(path) => {
                    info!("collector card written to {}", path.display());
                    CardStatus::Saved(path)
                }
                Err(e) => {
                    warn!("collector card not written: {e}");
                    CardStatus::Failed(e.to_string())
                }
            },
        );
    }

    fn handle_event(&mut self, ev: Event, now: Instant) -> Flow {
        match ev {
            Event::Key(key) => return self.handle_key(key, now),
            Event::FocusLost => {
                debug!("focus lost");
                self.focused = false;
                self.release_soft_drop();
                match &mut self.game {
                    Mounted::Snake(s) => {
                        // a countdown resumes play, so it waits for focus
                        s.pause();
                        s.cancel_countdown();
                    }
                    Mounted::Tetris(s) => s.pause(),
                }
                self.suspend_clock();
            }
            Event::FocusGained => {
                debug!("focus gained");
                self.focused = true;
                self.suspend_clock();
            }
            Event::Resize(w, h) => debug!("resized to {w}x{h}"),
            _ => {}
        }
        Flow::Continue
    }

    fn suspend_clock(&mut self) {
        match &mut self.game {
            Mounted::Snake(s) => s.suspend_clock(),
            Mounted::Tetris(s) => s.suspend_clock(),
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Flow {
        let flow = match self.game {
            Mounted::Snake(_) => self.snake_key(snake_action(key)),
            Mounted::Tetris(_) => self.tetris_key(tetris_action(key), now),
        };
        self.observe_phase();
        flow
    }

    fn snake_key(&mut self, action: SnakeAction) -> Flow {
        let Mounted::Snake(session) = &mut self.game else {
            return Flow::Continue;
        };
        match action {
            SnakeAction::Turn(dir) => session.sim_mut().set_direction(dir),
            SnakeAction::Start => match session.sim().status() {
                SnakeStatus::Idle => {
                    self.card = None;
                    self.confetti = None;
                    self.fade.clear();
                    session.sim_mut().start();
                    session.start();
                }
                SnakeStatus::GameOver | SnakeStatus::Won => {
                    session.stop();
                    session.sim_mut().reset_to_idle();
                    self.confetti = None;
                    self.fade.clear();
                }
                SnakeStatus::Running | SnakeStatus::Paused => {}
            },
            SnakeAction::Restart if session.sim().status().is_terminal() => {
                self.card = None;
                self.confetti = None;
                self.fade.clear();
                session.sim_mut().restart();
                session.start();
            }
            SnakeAction::Restart => {}
            SnakeAction::TogglePause => match session.state() {
                LoopState::Scheduled => session.pause(),
                LoopState::Suspended => session.resume_after(Countdown::new(
                    RESUME_COUNTDOWN_STEPS,
                    RESUME_COUNTDOWN_STEP,
                )),
                LoopState::CountingDown | LoopState::Stopped => {}
            },
            SnakeAction::SwitchGame => self.switch_game(),
            SnakeAction::Quit => return Flow::Quit,
            SnakeAction::None => {}
        }
        Flow::Continue
    }

    fn tetris_key(&mut self, action: TetrisAction, now: Instant) -> Flow {
        let Mounted::Tetris(session) = &mut self.game else {
            return Flow::Continue;
        };
        let status = session.sim().status();
        let startable = matches!(status, TetrisStatus::Idle | TetrisStatus::GameOver);
        match action {
            TetrisAction::Start | TetrisAction::HardDrop if startable => {
                self.fade.clear();
                session.sim_mut().reset();
                session.start();
            }
            TetrisAction::Start => {}
            TetrisAction::HardDrop => {
                let engine = session.sim_mut();
                if let Some(report) = engine.hard_drop() {
                    log_lock(report, engine.level());
                }
            }
            TetrisAction::MoveLeft => {
                session.sim_mut().try_move(-1, 0, false);
            }
            TetrisAction::MoveRight => {
                session.sim_mut().try_move(1, 0, false);
            }
            TetrisAction::RotateCw => {
                session.sim_mut().try_rotate(RotationDirection::Clockwise);
            }
            TetrisAction::RotateCcw => {
                session.sim_mut().try_rotate(RotationDirection::CounterClockwise);
            }
            TetrisAction::SoftDropPress if status == TetrisStatus::Running => {
                let engine = session.sim_mut();
                engine.set_soft_drop(true);
                if let MoveOutcome::Locked(report) = engine.soft_drop_nudge() {
                    log_lock(report, engine.level());
                }
                if !self.release_events {
                    self.soft_drop_deadline = Some(now + SOFT_DROP_HOLD_TIMEOUT);
                }
            }
            TetrisAction::SoftDropPress => {}
            TetrisAction::SoftDropRelease => self.release_soft_drop(),
            TetrisAction::TogglePause => match status {
                TetrisStatus::Running => session.pause(),
                TetrisStatus::Paused => session.resume(),
                TetrisStatus::Idle | TetrisStatus::GameOver => {}
            },
            TetrisAction::SwitchGame => self.switch_game(),
            TetrisAction::Quit => return Flow::Quit,
            TetrisAction::None => {}
        }
        Flow::Continue
    }

    fn release_soft_drop(&mut self) {
        self.soft_drop_deadline = None;
        if let Mounted::Tetris(s) = &mut self.game {
            s.sim_mut().set_soft_drop(false);
        }
    }

    /// Tears down the mounted game (loop, countdown, effects) and mounts a
    /// fresh idle instance of the other one.
    fn switch_game(&mut self) {
        match &mut self.game {
            Mounted::Snake(s) => s.stop(),
            Mounted::Tetris(s) => s.stop(),
        }
        let next = self.game.kind().other();
        self.game = mount(next, &self.config, self.seed);
        self.phase = self.game.phase();
        self.confetti = None;
        self.card = None;
        self.fade.clear();
        self.soft_drop_deadline = None;
        info!("switched to {}", next.label());
    }
}

/// Logs a failed draw. The frame is skipped and the loop carries on.
fn frame_drawn<T, E: std::fmt::Display>(result: Result<T, E>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            warn!("draw failed, frame skipped: {e}");
            false
        }
    }
}

fn log_lock(report: LockReport, level: u32) {
    if report.cleared > 0 {
        debug!("tetris: cleared {} rows for {}", report.cleared, report.awarded);
    }
    if report.level_up {
        info!("tetris: level {level}");
    }
    if report.game_over {
        debug!("tetris: spawn blocked");
    }
}

fn mount(kind: GameKind, config: &ArcadeConfig, seed: Option<u64>) -> Mounted {
    match kind {
        GameKind::Snake => {
            let settings = SnakeSettings::new(
                Duration::from_millis(config.snake_tick_ms.max(1)),
                config.reduced_motion,
            );
            Mounted::Snake(GameSession::new(SnakeEngine::new(settings, rng::seeded(seed))))
        }
        GameKind::Tetris => Mounted::Tetris(GameSession::new(TetrisEngine::new(rng::seeded(seed)))),
    }
}
