//! Layout and drawing: game tabs, Snake and Tetris boards, HUD, overlays,
//! pixel-font title screens.

use crate::app::{CardStatus, Mounted};
use crate::config::GameKind;
use crate::effects::{BoardFade, Confetti};
use crate::glyphs::{self, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::grid::Point;
use crate::session::GameSession;
use crate::snake::{self, Direction as Heading, SnakeEngine, SnakeStatus, WIN_SCORE};
use crate::tetris::{COLS, ROWS, TetrisEngine, TetrisStatus};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;

/// Each grid cell is two terminal columns wide so cells look square.
const CELL_W: u16 = 2;
const SIDEBAR_WIDTH: u16 = 20;
const SOLID: &str = "██";
const GHOST: &str = "░░";
const FOOD: &str = "▐▌";

/// Host state the renderer needs besides the mounted game.
pub struct Hud<'a> {
    pub card: Option<&'a CardStatus>,
    pub confetti: Option<&'a Confetti>,
    pub reduced_motion: bool,
    pub focused: bool,
}

/// Draws one frame for the mounted game.
pub fn draw(
    frame: &mut Frame,
    game: &Mounted,
    theme: &Theme,
    hud: &Hud,
    fade: &mut BoardFade,
    now: Instant,
) {
    let area = frame.area();
    Block::default()
        .style(Style::default().bg(theme.bg))
        .render(area, frame.buffer_mut());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Fill(1)])
        .split(area);
    draw_tabs(frame.buffer_mut(), chunks[0], game.kind(), theme);

    match game {
        Mounted::Snake(s) => draw_snake(frame, chunks[1], s, theme, hud, fade, now),
        Mounted::Tetris(s) => draw_tetris(frame, chunks[1], s, theme, hud, fade, now),
    }

    if let Some(confetti) = hud.confetti {
        confetti.render(frame.buffer_mut(), area);
    }
}

fn draw_tabs(buf: &mut Buffer, area: Rect, active: GameKind, theme: &Theme) {
    let tab = |kind: GameKind, label: &'static str| {
        if kind == active {
            Span::styled(
                label,
                Style::default()
                    .fg(theme.bg)
                    .bg(theme.title)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(label, Style::default().fg(theme.inactive_fg))
        }
    };
    let line = Line::from(vec![
        tab(GameKind::Snake, " SNAKE "),
        Span::from(" "),
        tab(GameKind::Tetris, " TETRIS "),
        Span::styled(
            "   tab switch · q quit",
            Style::default().fg(theme.inactive_fg),
        ),
    ]);
    Paragraph::new(line).render(area, buf);
}

/// Centered rect of `w`×`h` inside `area`, or `None` when it does not fit.
fn fit(area: Rect, w: u16, h: u16) -> Option<Rect> {
    if area.width < w || area.height < h {
        return None;
    }
    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(h),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    Some(vert[1])
}

fn popup_rect(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn draw_too_small(frame: &mut Frame, area: Rect, w: u16, h: u16, theme: &Theme) {
    let lines = vec![
        Line::from(Span::styled(
            "terminal too small",
            Style::default().fg(theme.danger).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("need {w}×{h}, have {}×{}", area.width, area.height),
            Style::default().fg(theme.inactive_fg),
        )),
    ];
    let rect = popup_rect(area, area.width, 2);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(rect, frame.buffer_mut());
}

fn board_block<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .style(Style::default().bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.title)))
}

/// Terminal position of grid cell `p`, if it is inside `inner`.
fn cell_origin(inner: Rect, p: Point) -> Option<(u16, u16)> {
    let (Ok(col), Ok(row)) = (u16::try_from(p.x), u16::try_from(p.y)) else {
        return None;
    };
    let x = inner.x + col * CELL_W;
    let y = inner.y + row;
    (x + CELL_W <= inner.right() && y < inner.bottom()).then_some((x, y))
}

fn put(buf: &mut Buffer, inner: Rect, p: Point, symbol: &str, style: Style) {
    if let Some((x, y)) = cell_origin(inner, p) {
        buf.set_string(x, y, symbol, style);
    }
}

fn fade_cells(inner: Rect, points: impl Iterator<Item = Point>) -> HashSet<(u16, u16)> {
    points
        .filter_map(|p| cell_origin(inner, p))
        .flat_map(|(x, y)| (0..CELL_W).map(move |dx| (x + dx, y)))
        .collect()
}

/// Renders `text` in the 5×7 pixel font, horizontally centered at row `y`.
/// Returns false (and draws nothing) when it does not fit.
fn draw_pixel_text(buf: &mut Buffer, area: Rect, y: u16, text: &str, color: Color) -> bool {
    let width = glyphs::text_width(text, 1) as u16;
    if width > area.width || y + GLYPH_HEIGHT as u16 > area.bottom() {
        return false;
    }
    let mut x = area.x + (area.width - width) / 2;
    let style = Style::default().fg(color);
    for ch in text.chars() {
        let g = glyphs::glyph(ch);
        for row in 0..GLYPH_HEIGHT {
            for col in 0..GLYPH_WIDTH {
                if glyphs::lit(&g, col, row) {
                    buf.set_string(x + col as u16, y + row as u16, "█", style);
                }
            }
        }
        x += GLYPH_WIDTH as u16 + 1;
    }
    true
}

/// Title screen shown while a game is idle. `title` rows are stacked in the
/// pixel font; a plain text line is used when they do not fit.
fn draw_title(buf: &mut Buffer, area: Rect, title: &[&str], hint: &str, theme: &Theme) {
    let top = area.y + 2;
    let rows = title.len() as u16;
    let height = rows * (GLYPH_HEIGHT as u16 + 1);
    let fits = top + height <= area.bottom()
        && title
            .iter()
            .all(|t| glyphs::text_width(t, 1) as u16 <= area.width);
    let hint_y = if fits {
        let mut y = top;
        for t in title {
            draw_pixel_text(buf, area, y, t, theme.title);
            y += GLYPH_HEIGHT as u16 + 1;
        }
        y + 1
    } else {
        let line = Line::from(Span::styled(
            title.concat(),
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        ));
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .render(Rect { y: top, height: 1, ..area }, buf);
        top + 2
    };
    if hint_y < area.bottom() {
        Paragraph::new(Line::from(Span::styled(
            hint,
            Style::default().fg(theme.inactive_fg),
        )))
        .alignment(Alignment::Center)
        .render(Rect { y: hint_y, height: 1, ..area }, buf);
    }
}

fn draw_popup(buf: &mut Buffer, area: Rect, lines: Vec<Line>, theme: &Theme) {
    let w = lines
        .iter()
        .map(Line::width)
        .max()
        .unwrap_or(0)
        .min(usize::from(u16::MAX)) as u16
        + 4;
    let h = lines.len() as u16 + 2;
    let rect = popup_rect(area, w, h);
    Clear.render(rect, buf);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .style(Style::default().bg(theme.bg)),
        )
        .render(rect, buf);
}

fn caption<'a>(text: impl Into<std::borrow::Cow<'a, str>>, color: Color) -> Line<'a> {
    Line::from(Span::styled(text, Style::default().fg(color)))
}

fn heading_caption<'a>(text: &'a str, color: Color) -> Line<'a> {
    Line::from(Span::styled(
        text,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

/// Big countdown digit over the board.
fn draw_countdown(buf: &mut Buffer, area: Rect, remaining: u8, theme: &Theme) {
    let digit = remaining.to_string();
    let y = area.y + area.height.saturating_sub(GLYPH_HEIGHT as u16) / 2;
    if !draw_pixel_text(buf, area, y, &digit, theme.main_fg) {
        draw_popup(buf, area, vec![heading_caption(&digit, theme.main_fg)], theme);
    }
}

// ---------------------------------------------------------------------------
// Snake
// ---------------------------------------------------------------------------

fn eyes(heading: Heading) -> &'static str {
    match heading {
        Heading::Up => "˙˙",
        Heading::Down => "..",
        Heading::Left => ": ",
        Heading::Right => " :",
    }
}

fn draw_snake(
    frame: &mut Frame,
    area: Rect,
    session: &GameSession<SnakeEngine>,
    theme: &Theme,
    hud: &Hud,
    fade: &mut BoardFade,
    now: Instant,
) {
    let engine = session.sim();
    let board_w = snake::GRID as u16 * CELL_W + 2;
    let board_h = snake::GRID as u16 + 2;
    let Some(outer) = fit(area, board_w, board_h) else {
        draw_too_small(frame, area, board_w, board_h + 1, theme);
        return;
    };

    let pill = Line::from(Span::styled(
        format!(" {} / {} ", engine.score(), WIN_SCORE),
        Style::default()
            .fg(theme.bg)
            .bg(theme.food)
            .add_modifier(Modifier::BOLD),
    ))
    .right_aligned();
    let block = board_block(" Snake ", theme).title(pill);
    let inner = block.inner(outer);
    block.render(outer, frame.buffer_mut());

    let status = engine.status();
    let over = status == SnakeStatus::GameOver;
    let dimmed = over && (hud.reduced_motion || fade.finished());
    let (body_style, head_style) = if dimmed {
        let s = Style::default().fg(theme.div_line).bg(theme.bg);
        (s, s)
    } else {
        (
            Style::default().fg(theme.snake).bg(theme.bg),
            Style::default().fg(theme.bg).bg(theme.snake_head),
        )
    };

    let buf = frame.buffer_mut();
    put(buf, inner, engine.food(), FOOD, Style::default().fg(theme.food));
    for &p in engine.body().iter().skip(1) {
        put(buf, inner, p, SOLID, body_style);
    }
    let head_symbol = if dimmed { SOLID } else { eyes(engine.heading()) };
    put(buf, inner, engine.head(), head_symbol, head_style);

    if over && !hud.reduced_motion && !fade.finished() {
        let cells = fade_cells(inner, engine.body().iter().copied());
        fade.render(frame, inner, cells, theme.div_line, theme.bg, now);
    }

    let buf = frame.buffer_mut();
    match status {
        SnakeStatus::Idle => draw_title(buf, inner, &["SNAKE"], "arrows steer · enter to start", theme),
        SnakeStatus::Running => {}
        SnakeStatus::Paused => match session.countdown() {
            Some(c) => draw_countdown(buf, inner, c.remaining(), theme),
            None => {
                let mut lines = vec![
                    heading_caption("paused", theme.title),
                    caption("p to resume", theme.inactive_fg),
                ];
                if !hud.focused {
                    lines.push(caption("window lost focus", theme.inactive_fg));
                }
                draw_popup(buf, inner, lines, theme);
            }
        },
        SnakeStatus::GameOver => draw_popup(
            buf,
            area,
            vec![
                heading_caption("game over", theme.danger),
                caption(format!("score {}", engine.score()), theme.main_fg),
                caption("enter to continue · r to play again", theme.inactive_fg),
            ],
            theme,
        ),
        SnakeStatus::Won => {
            let mut lines = vec![
                heading_caption("you win!", theme.food),
                caption(format!("score {}", engine.score()), theme.main_fg),
            ];
            match hud.card {
                Some(CardStatus::Saved(path)) => {
                    lines.push(caption("collector card saved", theme.main_fg));
                    lines.push(caption(path.display().to_string(), theme.inactive_fg));
                }
                Some(CardStatus::Failed(err)) => {
                    lines.push(caption("card not saved", theme.danger));
                    lines.push(caption(err.clone(), theme.inactive_fg));
                }
                None => {}
            }
            lines.push(caption("enter to continue · r to play again", theme.inactive_fg));
            draw_popup(buf, area, lines, theme);
        }
    }
}

// ---------------------------------------------------------------------------
// Tetris
// ---------------------------------------------------------------------------

fn draw_tetris(
    frame: &mut Frame,
    area: Rect,
    session: &GameSession<TetrisEngine>,
    theme: &Theme,
    hud: &Hud,
    fade: &mut BoardFade,
    now: Instant,
) {
    let engine = session.sim();
    let board_w = COLS as u16 * CELL_W + 2;
    let board_h = ROWS as u16 + 2;
    let total_w = board_w + SIDEBAR_WIDTH;
    let Some(outer) = fit(area, total_w, board_h) else {
        draw_too_small(frame, area, total_w, board_h + 1, theme);
        return;
    };
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(board_w), Constraint::Length(SIDEBAR_WIDTH)])
        .split(outer);

    let block = board_block(" Tetris ", theme);
    let inner = block.inner(chunks[0]);
    block.render(chunks[0], frame.buffer_mut());

    let status = engine.status();
    let over = status == TetrisStatus::GameOver;
    let dimmed = over && (hud.reduced_motion || fade.finished());
    let style_for = |id: u8| {
        let fg = if dimmed { theme.div_line } else { theme.piece_color(id) };
        Style::default().fg(fg).bg(theme.bg)
    };

    let buf = frame.buffer_mut();
    let mut occupied = Vec::new();
    for (row, cells) in engine.board().rows().iter().enumerate() {
        for (col, &id) in cells.iter().enumerate() {
            if id != 0 {
                let p = Point::new(col as i32, row as i32);
                put(buf, inner, p, SOLID, style_for(id));
                occupied.push(p);
            }
        }
    }

    if status != TetrisStatus::Idle {
        let piece = engine.piece();
        let id = piece.kind.id();
        if status == TetrisStatus::Running {
            let drop = engine.ghost_origin().y - piece.origin.y;
            let ghost = Style::default().fg(theme.piece_color(id)).bg(theme.bg);
            for p in piece.cells() {
                put(buf, inner, p.offset(0, drop), GHOST, ghost);
            }
        }
        for p in piece.cells() {
            put(buf, inner, p, SOLID, style_for(id));
            occupied.push(p);
        }
    }

    if over && !hud.reduced_motion && !fade.finished() {
        let cells = fade_cells(inner, occupied.into_iter());
        fade.render(frame, inner, cells, theme.div_line, theme.bg, now);
    }

    draw_sidebar(frame.buffer_mut(), chunks[1], engine, theme, hud);

    let buf = frame.buffer_mut();
    match status {
        TetrisStatus::Idle => draw_title(buf, inner, &["TET", "RIS"], "press enter to play", theme),
        TetrisStatus::Paused => draw_popup(
            buf,
            inner,
            vec![
                heading_caption("paused", theme.title),
                caption("p to resume", theme.inactive_fg),
            ],
            theme,
        ),
        TetrisStatus::GameOver => draw_popup(
            buf,
            inner,
            vec![
                heading_caption("game over", theme.danger),
                caption(format!("score {}", engine.score()), theme.main_fg),
            ],
            theme,
        ),
        TetrisStatus::Running => {}
    }
}

fn status_caption(status: TetrisStatus, focused: bool) -> Vec<&'static str> {
    match status {
        TetrisStatus::Idle => vec!["press enter to play"],
        TetrisStatus::Running => vec![],
        TetrisStatus::Paused if !focused => vec!["paused", "(focus lost)"],
        TetrisStatus::Paused => vec!["paused"],
        TetrisStatus::GameOver => vec!["game over", "press enter", "to restart"],
    }
}

fn draw_sidebar(buf: &mut Buffer, area: Rect, engine: &TetrisEngine, theme: &Theme, hud: &Hud) {
    let label = Style::default().fg(theme.title);
    let value = Style::default().fg(theme.main_fg);
    let stat = |name: &'static str, v: u32| {
        Line::from(vec![
            Span::styled(format!("{name:<7}"), label),
            Span::styled(v.to_string(), value),
        ])
    };

    let mut lines = vec![
        stat("Score", engine.score()),
        stat("Lines", engine.lines()),
        stat("Level", engine.level()),
        Line::from(""),
    ];
    let status_color = if engine.status() == TetrisStatus::GameOver {
        theme.danger
    } else {
        theme.inactive_fg
    };
    lines.extend(
        status_caption(engine.status(), hud.focused)
            .into_iter()
            .map(|c| caption(c, status_color)),
    );
    lines.push(Line::from(""));
    let hint = Style::default().fg(theme.inactive_fg);
    let held = Style::default().fg(theme.bg).bg(theme.title);
    for (keys, what) in [
        ("←→", "move"),
        ("↓", "soft drop"),
        ("↑ x", "rotate"),
        ("z", "rotate ccw"),
        ("space", "drop"),
        ("p", "pause"),
    ] {
        let what_style = if keys == "↓" && engine.soft_drop_held() {
            held
        } else {
            hint
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{keys:<6}"), label),
            Span::styled(what, what_style),
        ]));
    }

    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .style(Style::default().bg(theme.bg)),
        )
        .render(area, buf);
}
