//! Collector card awarded for beating Snake: a 720×1024 PNG with the player's
//! handle, the score and the final board.

use super::SnakeSnapshot;
use crate::glyphs::{self, GLYPH_HEIGHT, GLYPH_WIDTH};
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CARD_WIDTH: u32 = 720;
pub const CARD_HEIGHT: u32 = 1024;
pub const CARD_FILE_NAME: &str = "snake-collector-card.png";
/// Handle printed when the player did not give one.
pub const FALLBACK_HANDLE: &str = "player";

const MARGIN: i32 = 44;
const BOARD_TOP: i32 = 170;
const BOARD_SIZE: i32 = 432;

type Rgb = [u8; 3];

const BG_TOP: Rgb = [0x0b, 0x10, 0x20];
const BG_BOTTOM: Rgb = [0x0e, 0x17, 0x2a];
const GREEN: Rgb = [0x22, 0xc5, 0x5e];
const SKY: Rgb = [0x38, 0xbd, 0xf8];
const BOARD_BG: Rgb = [0x0b, 0x13, 0x24];
const TEXT: Rgb = [0xe2, 0xe8, 0xf0];
const WHITE: Rgb = [0xff, 0xff, 0xff];
const BLACK: Rgb = [0, 0, 0];

#[derive(Debug, Error)]
pub enum CardError {
    #[error("failed to write card: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode card: {0}")]
    Png(#[from] png::EncodingError),
}

/// Trims the handle and replaces inner whitespace runs with `-`.
pub fn normalize_handle(raw: &str) -> String {
    let joined = raw.split_whitespace().collect::<Vec<_>>().join("-");
    if joined.is_empty() {
        FALLBACK_HANDLE.to_string()
    } else {
        joined
    }
}

/// RGB8 raster with clipped, alpha-blended drawing primitives.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: i32,
    height: i32,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, fill: Rgb) -> Self {
        let pixels = fill
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self {
            width: width as i32,
            height: height as i32,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width as u32
    }

    pub fn height(&self) -> u32 {
        self.height as u32
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 3)
    }

    /// Blends `color` over the pixel at (`x`, `y`) with opacity `alpha`.
    pub fn blend(&mut self, x: i32, y: i32, color: Rgb, alpha: f32) {
        let Some(i) = self.index(x, y) else { return };
        let a = alpha.clamp(0.0, 1.0);
        for (dst, src) in self.pixels[i..i + 3].iter_mut().zip(color) {
            *dst = (f32::from(*dst) * (1.0 - a) + f32::from(src) * a).round() as u8;
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb, alpha: f32) {
        let (x0, y0) = (x.max(0), y.max(0));
        let (x1, y1) = ((x + w).min(self.width), (y + h).min(self.height));
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, color, alpha);
            }
        }
    }

    /// Outline of `thickness` pixels drawn inside the rectangle.
    pub fn stroke_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        thickness: i32,
        color: Rgb,
        alpha: f32,
    ) {
        let t = thickness.min(w / 2).min(h / 2).max(1);
        self.fill_rect(x, y, w, t, color, alpha);
        self.fill_rect(x, y + h - t, w, t, color, alpha);
        self.fill_rect(x, y + t, t, h - 2 * t, color, alpha);
        self.fill_rect(x + w - t, y + t, t, h - 2 * t, color, alpha);
    }

    /// Fills the canvas with a gradient running from the top-left corner to the
    /// bottom-right corner.
    pub fn diagonal_gradient(&mut self, from: Rgb, to: Rgb) {
        let span = (self.width + self.height - 2).max(1) as f32;
        for y in 0..self.height {
            for x in 0..self.width {
                let t = (x + y) as f32 / span;
                let mut c = [0u8; 3];
                for (k, out) in c.iter_mut().enumerate() {
                    let a = f32::from(from[k]);
                    let b = f32::from(to[k]);
                    *out = (a + (b - a) * t).round() as u8;
                }
                self.blend(x, y, c, 1.0);
            }
        }
    }

    pub fn fill_disc(&mut self, cx: i32, cy: i32, radius: i32, color: Rgb, alpha: f32) {
        let r2 = i64::from(radius) * i64::from(radius);
        for y in (cy - radius).max(0)..(cy + radius + 1).min(self.height) {
            for x in (cx - radius).max(0)..(cx + radius + 1).min(self.width) {
                let dx = i64::from(x - cx);
                let dy = i64::from(y - cy);
                if dx * dx + dy * dy <= r2 {
                    self.blend(x, y, color, alpha);
                }
            }
        }
    }

    /// Draws `text` with the pixel font; each font pixel is `scale`² pixels.
    /// Returns the drawn width.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, scale: i32, color: Rgb, alpha: f32) -> i32 {
        let advance = (GLYPH_WIDTH as i32 + 1) * scale;
        for (n, ch) in text.chars().enumerate() {
            let g = glyphs::glyph(ch);
            let gx = x + n as i32 * advance;
            for row in 0..GLYPH_HEIGHT {
                for col in 0..GLYPH_WIDTH {
                    if glyphs::lit(&g, col, row) {
                        self.fill_rect(
                            gx + col as i32 * scale,
                            y + row as i32 * scale,
                            scale,
                            scale,
                            color,
                            alpha,
                        );
                    }
                }
            }
        }
        text_width(text, scale)
    }
}

/// Width in pixels of `text` drawn at `scale`.
pub fn text_width(text: &str, scale: i32) -> i32 {
    glyphs::text_width(text, 1) as i32 * scale
}

/// Renders the card for `handle` (already normalized) and `score`.
pub fn render(handle: &str, score: u32, board: &SnakeSnapshot) -> Canvas {
    let (w, h) = (CARD_WIDTH as i32, CARD_HEIGHT as i32);
    let mut c = Canvas::new(CARD_WIDTH, CARD_HEIGHT, BG_TOP);
    c.diagonal_gradient(BG_TOP, BG_BOTTOM);
    c.fill_disc(w * 3 / 4, h / 4, 220, GREEN, 0.25);
    c.stroke_rect(24, 24, w - 48, h - 48, 2, WHITE, 0.12);

    c.draw_text(MARGIN, 56, "COLLECTOR CARD - SNAKE", 4, TEXT, 1.0);

    let handle_line = format!("@{handle}");
    c.draw_text(MARGIN, 112, &handle_line, 3, TEXT, 0.8);
    let score_line = format!("SCORE: {score}");
    let sw = text_width(&score_line, 3);
    c.draw_text(w - MARGIN - sw, 112, &score_line, 3, TEXT, 0.8);

    draw_board(&mut c, board);

    let band_y = BOARD_TOP + BOARD_SIZE + 40;
    c.fill_rect(MARGIN, band_y, w - 2 * MARGIN, 130, WHITE, 0.06);
    c.stroke_rect(MARGIN, band_y, w - 2 * MARGIN, 130, 1, WHITE, 0.12);
    c.draw_text(MARGIN + 20, band_y + 24, "YOU BEAT THE SNAKE", 4, TEXT, 1.0);
    c.draw_text(
        MARGIN + 20,
        band_y + 80,
        "A MINIMALIST TERMINAL ARCADE. THANKS FOR PLAYING!",
        2,
        TEXT,
        0.85,
    );

    c.draw_text(MARGIN, h - 64, "ARCADETUI", 2, TEXT, 0.6);
    c
}

fn draw_board(c: &mut Canvas, board: &SnakeSnapshot) {
    let cols = board.cols.max(1);
    let rows = board.rows.max(1);
    let cell = (BOARD_SIZE / cols.max(rows)).max(2);
    let (bw, bh) = (cell * cols, cell * rows);
    let bx = (CARD_WIDTH as i32 - bw) / 2;
    let by = BOARD_TOP;

    c.fill_rect(bx + 8, by + 8, bw, bh, BLACK, 0.35);
    c.fill_rect(bx, by, bw, bh, BOARD_BG, 1.0);
    c.stroke_rect(bx, by, bw, bh, 1, WHITE, 0.08);

    let mut paint = |p: crate::grid::Point, color: Rgb| {
        if (0..cols).contains(&p.x) && (0..rows).contains(&p.y) {
            c.fill_rect(bx + p.x * cell + 1, by + p.y * cell + 1, cell - 2, cell - 2, color, 1.0);
        }
    };
    paint(board.food, GREEN);
    for &p in &board.body {
        paint(p, SKY);
    }
}

/// Encodes `canvas` as an 8-bit RGB PNG.
pub fn encode_png(canvas: &Canvas) -> Result<Vec<u8>, CardError> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, canvas.width(), canvas.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&canvas.pixels)?;
    }
    Ok(out)
}

/// Renders the card and writes it to `dir`, creating the directory if needed.
pub fn save(dir: &Path, handle: &str, score: u32, board: &SnakeSnapshot) -> Result<PathBuf, CardError> {
    let canvas = render(&normalize_handle(handle), score, board);
    let bytes = encode_png(&canvas)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(CARD_FILE_NAME);
    let file = fs::File::create(&path)?;
    let mut w = BufWriter::new(file);
    std::io::Write::write_all(&mut w, &bytes)?;
    std::io::Write::flush(&mut w)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Point;

    impl Canvas {
        fn pixel(&self, x: i32, y: i32) -> Option<Rgb> {
            let i = self.index(x, y)?;
            Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
        }
    }

    fn snapshot() -> SnakeSnapshot {
        SnakeSnapshot {
            cols: 18,
            rows: 18,
            body: vec![Point::new(4, 4), Point::new(3, 4)],
            food: Point::new(10, 2),
        }
    }

    #[test]
    fn test_normalize_handle() {
        assert_eq!(normalize_handle("  ada   lovelace "), "ada-lovelace");
        assert_eq!(normalize_handle("grace"), "grace");
        assert_eq!(normalize_handle("   "), FALLBACK_HANDLE);
        assert_eq!(normalize_handle(""), FALLBACK_HANDLE);
    }

    #[test]
    fn test_blend_and_clipping() {
        let mut c = Canvas::new(4, 4, [0, 0, 0]);
        c.blend(1, 1, [200, 100, 50], 0.5);
        assert_eq!(c.pixel(1, 1), Some([100, 50, 25]));
        c.fill_rect(-10, -10, 100, 100, [255, 255, 255], 1.0);
        assert_eq!(c.pixel(3, 3), Some([255, 255, 255]));
        assert_eq!(c.pixel(4, 0), None);
    }

    #[test]
    fn test_render_paints_body_and_food() {
        let snap = snapshot();
        let c = render("tester", 20, &snap);
        assert_eq!(c.width(), CARD_WIDTH);
        assert_eq!(c.height(), CARD_HEIGHT);
        let cell = BOARD_SIZE / 18;
        let bx = (CARD_WIDTH as i32 - cell * 18) / 2;
        let center = |p: Point| (bx + p.x * cell + cell / 2, BOARD_TOP + p.y * cell + cell / 2);
        let (hx, hy) = center(snap.body[0]);
        assert_eq!(c.pixel(hx, hy), Some(SKY));
        let (fx, fy) = center(snap.food);
        assert_eq!(c.pixel(fx, fy), Some(GREEN));
        let (ex, ey) = center(Point::new(15, 15));
        assert_eq!(c.pixel(ex, ey), Some(BOARD_BG));
    }

    #[test]
    fn test_encode_png_signature() {
        let c = Canvas::new(8, 8, [1, 2, 3]);
        let bytes = encode_png(&c).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn test_save_writes_card_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("cards");
        let path = save(&target, "ada lovelace", 20, &snapshot()).unwrap();
        assert_eq!(path, target.join(CARD_FILE_NAME));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
