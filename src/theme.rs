//! Arcade colours: a fixed dark slate palette.

use ratatui::style::Color;

/// Colours for both games and the surrounding chrome.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Locked/active piece colours by cell id 1..=7 (I, O, T, S, Z, J, L).
    pub pieces: [Color; 7],
    pub snake: Color,
    pub snake_head: Color,
    pub food: Color,
    /// Board and popup background.
    pub bg: Color,
    /// Borders; also the colour cells fade to on game over.
    pub div_line: Color,
    /// Text (score, lines, level).
    pub main_fg: Color,
    /// Tabs, block titles, pixel-font titles.
    pub title: Color,
    /// Hints and captions.
    pub inactive_fg: Color,
    /// Game-over text.
    pub danger: Color,
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

const SLATE_PIECES: [Color; 7] = [
    rgb(0x38BDF8), // I sky
    rgb(0xEAB308), // O yellow
    rgb(0xA855F7), // T purple
    rgb(0x22C55E), // S green
    rgb(0xEF4444), // Z red
    rgb(0x94A3B8), // J slate
    rgb(0xF97316), // L orange
];

impl Default for Theme {
    fn default() -> Self {
        Self::slate_default()
    }
}

impl Theme {
    /// Dark slate defaults with the sky snake and green food.
    pub const fn slate_default() -> Self {
        Self {
            pieces: SLATE_PIECES,
            snake: rgb(0x38BDF8),
            snake_head: rgb(0x7DD3FC),
            food: rgb(0x22C55E),
            bg: rgb(0x0B1020),
            div_line: rgb(0x1E293B),
            main_fg: rgb(0xE2E8F0),
            title: rgb(0x22C55E),
            inactive_fg: rgb(0x94A3B8),
            danger: rgb(0xEF4444),
        }
    }

    /// Colour for a board cell id (1..=7); anything else maps to the text colour.
    #[inline]
    pub fn piece_color(&self, id: u8) -> Color {
        match id {
            1..=7 => self.pieces[usize::from(id - 1)],
            _ => self.main_fg,
        }
    }
}
