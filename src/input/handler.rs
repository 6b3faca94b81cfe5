use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::{Command, Direction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Command(Command),
    Quit,
    None,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            // Movement - Arrow keys
            KeyCode::Up => turn(Direction::Up),
            KeyCode::Down => turn(Direction::Down),
            KeyCode::Left => turn(Direction::Left),
            KeyCode::Right => turn(Direction::Right),

            // Movement - WASD
            KeyCode::Char('w') | KeyCode::Char('W') => turn(Direction::Up),
            KeyCode::Char('s') | KeyCode::Char('S') => turn(Direction::Down),
            KeyCode::Char('a') | KeyCode::Char('A') => turn(Direction::Left),
            KeyCode::Char('d') | KeyCode::Char('D') => turn(Direction::Right),

            // Controls
            KeyCode::Char(' ') | KeyCode::Enter => KeyAction::Command(Command::Start),
            KeyCode::Char('p') | KeyCode::Char('P') => KeyAction::Command(Command::TogglePause),
            KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Command(Command::Restart),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,

            _ => KeyAction::None,
        }
    }
}

fn turn(direction: Direction) -> KeyAction {
    KeyAction::Command(direction.into())
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_keys() {
        let handler = InputHandler::new();

        let up = KeyEvent::new(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(handler.handle_key_event(up), turn(Direction::Up));

        let down = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(handler.handle_key_event(down), turn(Direction::Down));

        let left = KeyEvent::new(KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(handler.handle_key_event(left), turn(Direction::Left));

        let right = KeyEvent::new(KeyCode::Right, KeyModifiers::NONE);
        assert_eq!(handler.handle_key_event(right), turn(Direction::Right));
    }

    #[test]
    fn test_wasd_keys() {
        let handler = InputHandler::new();

        let w = KeyEvent::new(KeyCode::Char('w'), KeyModifiers::NONE);
        assert_eq!(handler.handle_key_event(w), turn(Direction::Up));

        let a = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(handler.handle_key_event(a), turn(Direction::Left));
    }

    #[test]
    fn test_game_controls() {
        let handler = InputHandler::new();

        let space = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(
            handler.handle_key_event(space),
            KeyAction::Command(Command::Start)
        );

        let p = KeyEvent::new(KeyCode::Char('p'), KeyModifiers::NONE);
        assert_eq!(
            handler.handle_key_event(p),
            KeyAction::Command(Command::TogglePause)
        );

        let r = KeyEvent::new(KeyCode::Char('R'), KeyModifiers::SHIFT);
        assert_eq!(
            handler.handle_key_event(r),
            KeyAction::Command(Command::Restart)
        );
    }

    #[test]
    fn test_quit_keys() {
        let handler = InputHandler::new();

        let q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(handler.handle_key_event(q), KeyAction::Quit);

        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(handler.handle_key_event(esc), KeyAction::Quit);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handler.handle_key_event(ctrl_c), KeyAction::Quit);
    }

    #[test]
    fn test_unknown_key() {
        let handler = InputHandler::new();

        let x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(handler.handle_key_event(x), KeyAction::None);
    }
}
