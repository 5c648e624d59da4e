//! Key mapping
//!
//! Global keys:
//! - F1 / F2 / F3: transfer, query, audit view
//! - Ctrl+C / Ctrl+Q: quit
//!
//! Everything else depends on the active view (see [`map_key_event`]).

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::console::View;

/// Operator intent decoded from a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    SwitchView(View),
    // transfer view
    NextField,
    PrevField,
    StartTransfer,
    TestConnection,
    StopPolling,
    ResumePolling,
    DownloadReport,
    // query view
    ExecuteQuery,
    ToggleTarget,
    Newline,
    // audit view
    RefreshAudit,
    ScrollUp,
    ScrollDown,
    // text editing (form field or statement)
    Insert(char),
    Backspace,
}

pub fn map_key_event(view: View, key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => return Some(Action::Quit),
        KeyCode::F(1) => return Some(Action::SwitchView(View::Transfer)),
        KeyCode::F(2) => return Some(Action::SwitchView(View::Query)),
        KeyCode::F(3) => return Some(Action::SwitchView(View::Audit)),
        _ => {}
    }

    match view {
        View::Transfer => match key.code {
            KeyCode::Char('s') if ctrl => Some(Action::StartTransfer),
            KeyCode::Char('t') if ctrl => Some(Action::TestConnection),
            KeyCode::Char('x') if ctrl => Some(Action::StopPolling),
            KeyCode::Char('w') if ctrl => Some(Action::ResumePolling),
            KeyCode::Char('d') if ctrl => Some(Action::DownloadReport),
            KeyCode::Tab | KeyCode::Down => Some(Action::NextField),
            KeyCode::BackTab | KeyCode::Up => Some(Action::PrevField),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Char(c) if is_plain(key.modifiers) => Some(Action::Insert(c)),
            _ => None,
        },
        View::Query => match key.code {
            KeyCode::Char('e') if ctrl => Some(Action::ExecuteQuery),
            KeyCode::F(5) => Some(Action::ExecuteQuery),
            KeyCode::Char('o') if ctrl => Some(Action::ToggleTarget),
            KeyCode::Enter => Some(Action::Newline),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Char(c) if is_plain(key.modifiers) => Some(Action::Insert(c)),
            _ => None,
        },
        View::Audit => match key.code {
            KeyCode::Char('r') if ctrl => Some(Action::RefreshAudit),
            KeyCode::Up => Some(Action::ScrollUp),
            KeyCode::Down => Some(Action::ScrollDown),
            _ => None,
        },
    }
}

fn is_plain(modifiers: KeyModifiers) -> bool {
    !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}
