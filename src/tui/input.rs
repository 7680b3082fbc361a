//! Input handling and keybindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::state::ViewState;
use crate::view::Mode;

/// Result of handling a key event.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// No action, keep polling.
    None,
    /// Quit the application.
    Quit,
    /// Scroll offset changed; redraw now.
    Redraw,
    /// Mode changed; end the poll phase and run the next tick.
    NextTick,
    /// Show the help screen.
    Help,
}

/// Handles a key press and updates state.
pub fn handle_key(state: &mut ViewState, key: KeyEvent) -> KeyAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => KeyAction::Quit,
            _ => KeyAction::None,
        };
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,

        KeyCode::Char('s') | KeyCode::Char('S') => switch(state, Mode::Slab),
        KeyCode::Char('h') | KeyCode::Char('H') => switch(state, Mode::Host),
        KeyCode::Char('c') | KeyCode::Char('C') => switch(state, Mode::Command),

        KeyCode::Char('j') | KeyCode::Char('J') | KeyCode::Down => {
            state.scroll_down();
            KeyAction::Redraw
        }
        KeyCode::Char('k') | KeyCode::Char('K') | KeyCode::Up => {
            state.scroll_up();
            KeyAction::Redraw
        }

        KeyCode::Char('?') => KeyAction::Help,
        _ => KeyAction::None,
    }
}

fn switch(state: &mut ViewState, mode: Mode) -> KeyAction {
    state.switch_mode(mode);
    KeyAction::NextTick
}
