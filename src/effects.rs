//! Visual effects: the confetti burst on a Snake win and the game-over board
//! fade (TachyonFX).

use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Style};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

const CONFETTI_COUNT: usize = 140;
const CONFETTI_LIFETIME: Duration = Duration::from_millis(2_000);
/// Downward acceleration in screen heights per second².
const GRAVITY: f32 = 1.6;
const CONFETTI_GLYPHS: [&str; 4] = ["▪", "▫", "•", "✦"];
const CONFETTI_COLORS: [Color; 6] = [
    Color::Rgb(0x22, 0xc5, 0x5e),
    Color::Rgb(0x38, 0xbd, 0xf8),
    Color::Rgb(0xea, 0xb3, 0x08),
    Color::Rgb(0xa8, 0x55, 0xf7),
    Color::Rgb(0xef, 0x44, 0x44),
    Color::Rgb(0xf9, 0x73, 0x16),
];

/// Duration of the game-over fade in ms.
const GAME_OVER_FADE_MS: u32 = 900;

/// One confetti piece in normalized screen coordinates (0..1 on both axes).
#[derive(Debug, Clone, Copy)]
struct Particle {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    color: Color,
    glyph: &'static str,
}

/// Short-lived confetti burst fired from both side edges.
#[derive(Debug, Clone)]
pub struct Confetti {
    particles: Vec<Particle>,
    elapsed: Duration,
}

impl Confetti {
    pub fn burst(rng: &mut fastrand::Rng) -> Self {
        let particles = (0..CONFETTI_COUNT)
            .map(|i| {
                let from_left = i % 2 == 0;
                let speed = 0.25 + rng.f32() * 0.45;
                Particle {
                    x: if from_left { 0.0 } else { 1.0 },
                    y: 0.55 + rng.f32() * 0.4,
                    vx: if from_left { speed } else { -speed },
                    vy: -(0.6 + rng.f32() * 0.8),
                    color: CONFETTI_COLORS[rng.usize(..CONFETTI_COLORS.len())],
                    glyph: CONFETTI_GLYPHS[rng.usize(..CONFETTI_GLYPHS.len())],
                }
            })
            .collect();
        Self {
            particles,
            elapsed: Duration::ZERO,
        }
    }

    pub fn update(&mut self, dt: Duration) {
        self.elapsed += dt;
        let t = dt.as_secs_f32();
        for p in &mut self.particles {
            p.vy += GRAVITY * t;
            p.x += p.vx * t;
            p.y += p.vy * t;
        }
        self.particles
            .retain(|p| (-0.1..=1.1).contains(&p.x) && p.y <= 1.05);
    }

    pub fn is_done(&self) -> bool {
        self.elapsed >= CONFETTI_LIFETIME || self.particles.is_empty()
    }

    /// Particles still on screen.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn render(&self, buf: &mut Buffer, area: Rect) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        for p in &self.particles {
            if !(0.0..1.0).contains(&p.x) || !(0.0..1.0).contains(&p.y) {
                continue;
            }
            let x = area.x + (p.x * f32::from(area.width)) as u16;
            let y = area.y + (p.y * f32::from(area.height)) as u16;
            if let Some(cell) = buf.cell_mut(Position::new(x, y)) {
                cell.set_symbol(p.glyph).set_style(Style::default().fg(p.color));
            }
        }
    }
}

/// Fades the occupied board cells to a dim colour once a game ends.
#[derive(Default)]
pub struct BoardFade {
    effect: Option<Effect>,
    last_process: Option<Instant>,
}

impl BoardFade {
    pub fn clear(&mut self) {
        self.effect = None;
        self.last_process = None;
    }

    /// True once the fade has played out; the board is then drawn dimmed.
    pub fn finished(&self) -> bool {
        self.effect.as_ref().is_some_and(Effect::done)
    }

    /// Starts (first call) and advances the fade over `cells` inside `board`.
    pub fn render(
        &mut self,
        frame: &mut Frame,
        board: Rect,
        cells: HashSet<(u16, u16)>,
        dim: Color,
        bg: Color,
        now: Instant,
    ) {
        let delta = self
            .last_process
            .map_or(Duration::ZERO, |t| now.saturating_duration_since(t));
        let delta_ms = delta.as_millis().min(u128::from(u32::MAX)) as u32;
        self.last_process = Some(now);

        let effect = self.effect.get_or_insert_with(|| {
            let filter =
                CellFilter::PositionFn(ref_count(move |pos: Position| cells.contains(&(pos.x, pos.y))));
            fx::fade_to(dim, bg, (GAME_OVER_FADE_MS, Interpolation::QuadOut))
                .with_filter(filter)
                .with_area(board)
        });
        if !effect.done() {
            frame.render_effect(effect, board, TfxDuration::from_millis(delta_ms));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confetti_falls_and_expires() {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut c = Confetti::burst(&mut rng);
        assert_eq!(c.len(), CONFETTI_COUNT);
        assert!(!c.is_done());
        for _ in 0..30 {
            c.update(Duration::from_millis(70));
        }
        assert!(c.is_done());
    }

    #[test]
    fn test_confetti_renders_inside_area() {
        let mut rng = fastrand::Rng::with_seed(5);
        let mut c = Confetti::burst(&mut rng);
        c.update(Duration::from_millis(300));
        let area = Rect::new(0, 0, 40, 20);
        let mut buf = Buffer::empty(area);
        c.render(&mut buf, area);
        let drawn = buf
            .content()
            .iter()
            .filter(|cell| cell.symbol() != " ")
            .count();
        assert!(drawn > 0);
    }

    #[test]
    fn test_board_fade_starts_idle() {
        let fade = BoardFade::default();
        assert!(!fade.finished());
    }
}
