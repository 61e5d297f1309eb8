//! Key bindings per game: arrows plus wasd (Snake) or vim keys (Tetris).

use crate::snake::Direction;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakeAction {
    Turn(Direction),
    Start,
    /// Play again straight from the game-over or win screen.
    Restart,
    TogglePause,
    SwitchGame,
    Quit,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TetrisAction {
    MoveLeft,
    MoveRight,
    /// Soft drop key pressed or auto-repeated.
    SoftDropPress,
    SoftDropRelease,
    RotateCw,
    RotateCcw,
    /// Hard drop while running, start otherwise.
    HardDrop,
    Start,
    TogglePause,
    SwitchGame,
    Quit,
    None,
}

/// Plain keys only; Shift is tolerated so caps lock does not swallow input.
fn plain(modifiers: KeyModifiers) -> bool {
    modifiers.is_empty() || modifiers == KeyModifiers::SHIFT
}

fn ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers == KeyModifiers::CONTROL && matches!(key.code, KeyCode::Char('c' | 'C'))
}

pub fn snake_action(key: KeyEvent) -> SnakeAction {
    if key.kind == KeyEventKind::Release {
        return SnakeAction::None;
    }
    if ctrl_c(&key) {
        return SnakeAction::Quit;
    }
    if !plain(key.modifiers) {
        return SnakeAction::None;
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('w' | 'W') => SnakeAction::Turn(Direction::Up),
        KeyCode::Down | KeyCode::Char('s' | 'S') => SnakeAction::Turn(Direction::Down),
        KeyCode::Left | KeyCode::Char('a' | 'A') => SnakeAction::Turn(Direction::Left),
        KeyCode::Right | KeyCode::Char('d' | 'D') => SnakeAction::Turn(Direction::Right),
        KeyCode::Enter | KeyCode::Char(' ') => SnakeAction::Start,
        KeyCode::Char('p' | 'P') => SnakeAction::TogglePause,
        KeyCode::Char('r' | 'R') => SnakeAction::Restart,
        KeyCode::Tab => SnakeAction::SwitchGame,
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => SnakeAction::Quit,
        _ => SnakeAction::None,
    }
}

pub fn tetris_action(key: KeyEvent) -> TetrisAction {
    let soft_drop_key = matches!(key.code, KeyCode::Down | KeyCode::Char('j' | 'J'));
    if key.kind == KeyEventKind::Release {
        return if soft_drop_key {
            TetrisAction::SoftDropRelease
        } else {
            TetrisAction::None
        };
    }
    if ctrl_c(&key) {
        return TetrisAction::Quit;
    }
    if !plain(key.modifiers) {
        return TetrisAction::None;
    }
    if soft_drop_key {
        return TetrisAction::SoftDropPress;
    }
    match key.code {
        KeyCode::Left | KeyCode::Char('h' | 'H') => TetrisAction::MoveLeft,
        KeyCode::Right | KeyCode::Char('l' | 'L') => TetrisAction::MoveRight,
        KeyCode::Up | KeyCode::Char('x' | 'X' | 'k' | 'K') => TetrisAction::RotateCw,
        KeyCode::Char('z' | 'Z' | 'u' | 'U') => TetrisAction::RotateCcw,
        KeyCode::Char(' ') => TetrisAction::HardDrop,
        KeyCode::Enter => TetrisAction::Start,
        KeyCode::Char('p' | 'P') => TetrisAction::TogglePause,
        KeyCode::Tab => TetrisAction::SwitchGame,
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => TetrisAction::Quit,
        _ => TetrisAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn with_kind(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_snake_arrows_and_wasd() {
        assert_eq!(snake_action(press(KeyCode::Up)), SnakeAction::Turn(Direction::Up));
        assert_eq!(
            snake_action(press(KeyCode::Char('a'))),
            SnakeAction::Turn(Direction::Left)
        );
        assert_eq!(
            snake_action(KeyEvent::new(KeyCode::Char('D'), KeyModifiers::SHIFT)),
            SnakeAction::Turn(Direction::Right)
        );
        assert_eq!(snake_action(press(KeyCode::Char(' '))), SnakeAction::Start);
        assert_eq!(snake_action(press(KeyCode::Enter)), SnakeAction::Start);
        assert_eq!(snake_action(press(KeyCode::Char('r'))), SnakeAction::Restart);
    }

    #[test]
    fn test_snake_ignores_release_and_modifiers() {
        assert_eq!(
            snake_action(with_kind(KeyCode::Up, KeyEventKind::Release)),
            SnakeAction::None
        );
        assert_eq!(
            snake_action(KeyEvent::new(KeyCode::Char('w'), KeyModifiers::ALT)),
            SnakeAction::None
        );
        assert_eq!(
            snake_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            SnakeAction::Quit
        );
    }

    #[test]
    fn test_tetris_bindings() {
        assert_eq!(tetris_action(press(KeyCode::Left)), TetrisAction::MoveLeft);
        assert_eq!(tetris_action(press(KeyCode::Char('l'))), TetrisAction::MoveRight);
        assert_eq!(tetris_action(press(KeyCode::Up)), TetrisAction::RotateCw);
        assert_eq!(tetris_action(press(KeyCode::Char('x'))), TetrisAction::RotateCw);
        assert_eq!(tetris_action(press(KeyCode::Char('z'))), TetrisAction::RotateCcw);
        assert_eq!(tetris_action(press(KeyCode::Char(' '))), TetrisAction::HardDrop);
        assert_eq!(tetris_action(press(KeyCode::Enter)), TetrisAction::Start);
        assert_eq!(tetris_action(press(KeyCode::Char('p'))), TetrisAction::TogglePause);
        assert_eq!(tetris_action(press(KeyCode::Tab)), TetrisAction::SwitchGame);
        assert_eq!(tetris_action(press(KeyCode::Esc)), TetrisAction::Quit);
    }

    #[test]
    fn test_tetris_soft_drop_hold() {
        assert_eq!(tetris_action(press(KeyCode::Down)), TetrisAction::SoftDropPress);
        assert_eq!(
            tetris_action(with_kind(KeyCode::Down, KeyEventKind::Repeat)),
            TetrisAction::SoftDropPress
        );
        assert_eq!(
            tetris_action(with_kind(KeyCode::Down, KeyEventKind::Release)),
            TetrisAction::SoftDropRelease
        );
        assert_eq!(
            tetris_action(with_kind(KeyCode::Left, KeyEventKind::Release)),
            TetrisAction::None
        );
    }
}
