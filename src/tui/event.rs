//! Event types for the TUI
//!
//! This module implements a dual-channel event architecture:
//! - InputEvent: Priority channel for user input (never dropped)
//! - DataEvent: Data channel for updates (may be dropped under load)

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};

use jqmon::models::{EntityKind, Snapshot};

/// Input events from the terminal (priority channel - never dropped)
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// Keyboard input
    Key(KeyEvent),
    /// Mouse input
    Mouse(MouseEvent),
    /// Terminal resize
    #[allow(dead_code)]
    Resize(u16, u16),
}

/// Data and control events (data channel - may be dropped under load)
///
/// Every fetch result carries the generation of the request that produced
/// it. Generations increase per source; the app ignores results older than
/// the last one it applied.
#[derive(Debug)]
pub enum DataEvent {
    /// Animation tick for spinners/clocks (200ms, only if visible)
    AnimationTick,

    /// A fresh snapshot for one entity kind
    SnapshotUpdated {
        source: EntityKind,
        generation: u64,
        snapshot: Snapshot,
    },

    /// Fetch error from a data source
    FetchError {
        source: EntityKind,
        generation: u64,
        error: String,
    },
}

/// Result of processing an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Continue running, UI needs redraw
    Continue,
    /// Continue running, no UI change needed
    Unchanged,
    /// Quit the application
    Quit,
}

/// Which key map applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Detail,
}

/// Key action mappings for the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    // Navigation
    MoveUp,
    MoveDown,
    MoveToTop,
    MoveToBottom,
    PageUp,
    PageDown,

    // View switching
    SwitchToJobs,
    SwitchToQueues,
    NextView,

    // Actions
    Select,
    Refresh,
    QuickSearch,
    ToggleSearchMode,
    YankId,
    ExportData,    // 'e' - Export to JSON (default)
    ExportDataCsv, // 'E' - Export to CSV
    ShowEnvironment,

    // UI
    ShowHelp,
    Escape,
    Quit,

    // Search mode specific
    FilterClear,
    FilterBackspace,
    FilterChar(char),

    // Mouse actions
    MouseClick { row: u16, column: u16 },
    MouseScrollUp,
    MouseScrollDown,

    // Unknown/unhandled
    Unknown,
}

impl KeyAction {
    /// Map a mouse event to an action
    pub fn from_mouse_event(event: MouseEvent) -> Self {
        use crossterm::event::{MouseButton, MouseEventKind};

        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => KeyAction::MouseClick {
                row: event.row,
                column: event.column,
            },
            MouseEventKind::ScrollUp => KeyAction::MouseScrollUp,
            MouseEventKind::ScrollDown => KeyAction::MouseScrollDown,
            _ => KeyAction::Unknown,
        }
    }

    /// Map a key event to an action based on current mode
    pub fn from_key_event(event: KeyEvent, mode: InputMode) -> Self {
        let KeyEvent {
            code, modifiers, ..
        } = event;
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);

        match mode {
            InputMode::Search => match code {
                KeyCode::Esc => KeyAction::Escape,
                KeyCode::Enter => KeyAction::Select,
                KeyCode::Backspace => KeyAction::FilterBackspace,
                KeyCode::Char('c') if ctrl => KeyAction::Quit,
                KeyCode::Char('u') if ctrl => KeyAction::FilterClear,
                KeyCode::Char('d') if ctrl => KeyAction::ToggleSearchMode,
                KeyCode::Char(c) => KeyAction::FilterChar(c),
                _ => KeyAction::Unknown,
            },
            InputMode::Detail => match code {
                KeyCode::Char('c') if ctrl => KeyAction::Quit,
                KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => KeyAction::Escape,
                KeyCode::Char('j') | KeyCode::Down => KeyAction::MoveDown,
                KeyCode::Char('k') | KeyCode::Up => KeyAction::MoveUp,
                KeyCode::Char('g') | KeyCode::Home => KeyAction::MoveToTop,
                KeyCode::Char('G') | KeyCode::End => KeyAction::MoveToBottom,
                KeyCode::PageDown => KeyAction::PageDown,
                KeyCode::PageUp => KeyAction::PageUp,
                KeyCode::Char('e') => KeyAction::ShowEnvironment,
                KeyCode::Char('y') => KeyAction::YankId,
                _ => KeyAction::Unknown,
            },
            InputMode::Normal => match code {
                // Quit
                KeyCode::Char('q') => KeyAction::Quit,

                // Ctrl+ combinations must come before bare character matches
                KeyCode::Char('c') if ctrl => KeyAction::Quit,
                KeyCode::Char('d') if ctrl => KeyAction::PageDown,
                KeyCode::Char('u') if ctrl => KeyAction::PageUp,

                // Navigation
                KeyCode::Char('j') | KeyCode::Down => KeyAction::MoveDown,
                KeyCode::Char('k') | KeyCode::Up => KeyAction::MoveUp,
                KeyCode::Char('g') | KeyCode::Home => KeyAction::MoveToTop,
                KeyCode::Char('G') | KeyCode::End => KeyAction::MoveToBottom,
                KeyCode::PageDown => KeyAction::PageDown,
                KeyCode::PageUp => KeyAction::PageUp,

                // View switching
                KeyCode::Char('1') => KeyAction::SwitchToJobs,
                KeyCode::Char('2') => KeyAction::SwitchToQueues,
                KeyCode::Tab => KeyAction::NextView,

                // Actions
                KeyCode::Enter => KeyAction::Select,
                KeyCode::Char('r') => KeyAction::Refresh,
                KeyCode::Char('/') => KeyAction::QuickSearch,
                KeyCode::Char('y') => KeyAction::YankId,
                KeyCode::Char('e') => KeyAction::ExportData,
                KeyCode::Char('E') => KeyAction::ExportDataCsv,

                // Help
                KeyCode::Char('?') | KeyCode::F(1) => KeyAction::ShowHelp,
                KeyCode::Esc => KeyAction::Escape,

                _ => KeyAction::Unknown,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_key_action_quit() {
        let event = key(KeyCode::Char('q'));
        assert_eq!(KeyAction::from_key_event(event, InputMode::Normal), KeyAction::Quit);
        // in search mode 'q' is just text
        assert_eq!(
            KeyAction::from_key_event(event, InputMode::Search),
            KeyAction::FilterChar('q')
        );
        // Ctrl+C quits from everywhere
        for mode in [InputMode::Normal, InputMode::Search, InputMode::Detail] {
            assert_eq!(KeyAction::from_key_event(ctrl('c'), mode), KeyAction::Quit);
        }
    }

    #[test]
    fn test_key_action_navigation() {
        let event = key(KeyCode::Char('j'));
        assert_eq!(KeyAction::from_key_event(event, InputMode::Normal), KeyAction::MoveDown);

        let event = key(KeyCode::Char('k'));
        assert_eq!(KeyAction::from_key_event(event, InputMode::Detail), KeyAction::MoveUp);
    }

    #[test]
    fn test_view_switching() {
        assert_eq!(
            KeyAction::from_key_event(key(KeyCode::Char('2')), InputMode::Normal),
            KeyAction::SwitchToQueues
        );
        assert_eq!(
            KeyAction::from_key_event(key(KeyCode::Tab), InputMode::Normal),
            KeyAction::NextView
        );
    }

    #[test]
    fn test_ctrl_d_depends_on_mode() {
        assert_eq!(
            KeyAction::from_key_event(ctrl('d'), InputMode::Search),
            KeyAction::ToggleSearchMode
        );
        assert_eq!(
            KeyAction::from_key_event(ctrl('d'), InputMode::Normal),
            KeyAction::PageDown
        );
    }

    #[test]
    fn test_search_mode_ctrl_u() {
        assert_eq!(
            KeyAction::from_key_event(ctrl('u'), InputMode::Search),
            KeyAction::FilterClear
        );
        assert_eq!(KeyAction::from_key_event(ctrl('u'), InputMode::Normal), KeyAction::PageUp);
    }

    #[test]
    fn test_e_depends_on_mode() {
        let event = key(KeyCode::Char('e'));
        assert_eq!(
            KeyAction::from_key_event(event, InputMode::Normal),
            KeyAction::ExportData
        );
        assert_eq!(
            KeyAction::from_key_event(event, InputMode::Detail),
            KeyAction::ShowEnvironment
        );
    }
}
