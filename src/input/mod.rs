//! Key translation: crossterm events to the discrete keys the picker understands.
//!
//! The picker never sees raw terminal events. Command letters (`n`, `d`, `m`,
//! `y`) arrive as [`PickerKey::Char`]; whether they are commands or query text
//! is decided by the picker from its current phase and query.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Rows moved by PageUp/PageDown
pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKey {
    /// Printable character
    Char(char),
    Backspace,
    /// Empty the query (or the name prompt)
    ClearQuery,
    Up,
    Down,
    PageUp,
    PageDown,
    Enter,
    Escape,
    /// Re-open in the other mode
    ToggleMode,
    /// Re-snapshot without acting
    Refresh,
}

/// Translate a key event, or `None` for keys the picker ignores.
pub fn picker_key(key: KeyEvent) -> Option<PickerKey> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let picker_key = match key.code {
        KeyCode::Char('c') if ctrl => PickerKey::Escape,
        KeyCode::Char('u') if ctrl => PickerKey::ClearQuery,
        KeyCode::Char('k' | 'p') if ctrl => PickerKey::Up,
        KeyCode::Char('j' | 'n') if ctrl => PickerKey::Down,
        KeyCode::Char('r') if ctrl => PickerKey::Refresh,
        KeyCode::Char(_) if ctrl || key.modifiers.contains(KeyModifiers::ALT) => return None,
        KeyCode::Char(c) if !c.is_control() => PickerKey::Char(c),
        KeyCode::Backspace => PickerKey::Backspace,
        KeyCode::Up => PickerKey::Up,
        KeyCode::Down => PickerKey::Down,
        KeyCode::PageUp => PickerKey::PageUp,
        KeyCode::PageDown => PickerKey::PageDown,
        KeyCode::Enter => PickerKey::Enter,
        KeyCode::Esc => PickerKey::Escape,
        KeyCode::Tab => PickerKey::ToggleMode,
        _ => return None,
    };
    Some(picker_key)
}
