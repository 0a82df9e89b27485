//! Key and mouse mapping from terminal events to viewer actions.

use crate::types::ViewAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// A left click at a terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Click {
    pub column: u16,
    pub row: u16,
}

/// Map keyboard input to viewer actions.
pub fn handle_key_event(key: KeyEvent) -> Option<ViewAction> {
    match key.code {
        // Simulation
        KeyCode::Char(' ') | KeyCode::Char('n') | KeyCode::Char('N') => Some(ViewAction::Advance),
        KeyCode::Char('g') | KeyCode::Char('G') => Some(ViewAction::Fetch),
        KeyCode::Char('a') | KeyCode::Char('A') => Some(ViewAction::ToggleAutoplay),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(ViewAction::Recreate),

        // View
        KeyCode::Char('+') | KeyCode::Char('=') => Some(ViewAction::ZoomIn),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(ViewAction::ZoomOut),
        KeyCode::Char('m') | KeyCode::Char('M') => Some(ViewAction::ToggleFade),
        KeyCode::Esc => Some(ViewAction::ClearSelection),

        // Panning
        KeyCode::Left | KeyCode::Char('h') => Some(ViewAction::PanLeft),
        KeyCode::Right | KeyCode::Char('l') => Some(ViewAction::PanRight),
        KeyCode::Up | KeyCode::Char('k') => Some(ViewAction::PanUp),
        KeyCode::Down | KeyCode::Char('j') => Some(ViewAction::PanDown),

        _ => None,
    }
}

/// Only left-button presses select; drags, scrolls and releases are ignored.
pub fn handle_mouse_event(ev: MouseEvent) -> Option<Click> {
    match ev.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Click {
            column: ev.column,
            row: ev.row,
        }),
        _ => None,
    }
}

/// Check if key should quit the viewer.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
