//! Action handlers
//!
//! Translate decoded key actions into console operations. Rejections are
//! already recorded as notices by the console, so results are dropped here.

use crate::console::{Console, View};
use crate::ui::input::Action;
use crate::ui::state::UiState;

pub fn handle_action(console: &mut Console, ui: &mut UiState, action: Action) {
    match action {
        Action::Quit => ui.quit(),
        Action::SwitchView(view) => console.switch_view(view),
        Action::NextField => ui.focus_next(),
        Action::PrevField => ui.focus_prev(),
        Action::StartTransfer => {
            let _ = console.start_transfer();
        }
        Action::TestConnection => console.test_connection(),
        Action::StopPolling => {
            console.stop_polling();
        }
        Action::ResumePolling => {
            let _ = console.resume_polling();
        }
        Action::DownloadReport => {
            let _ = console.download_report(None);
        }
        Action::ExecuteQuery => {
            let _ = console.execute_query();
        }
        Action::ToggleTarget => console.query_mut().toggle_target(),
        Action::Newline => console.query_mut().query_mut().push('\n'),
        Action::RefreshAudit => console.refresh_audit(),
        Action::ScrollUp => ui.scroll_up(),
        Action::ScrollDown => ui.scroll_down(console.audit().entries().len()),
        Action::Insert(c) => edit(console, ui, |text| text.push(c)),
        Action::Backspace => edit(console, ui, |text| {
            text.pop();
        }),
    }
}

/// Apply an edit to whatever text the current view is editing
fn edit<F>(console: &mut Console, ui: &UiState, f: F)
where
    F: FnOnce(&mut String),
{
    match console.view() {
        View::Transfer => {
            let field = ui.focused_field();
            let mut text = console.config().text(field);
            f(&mut text);
            console.config_mut().set(field, &text);
        }
        View::Query => f(console.query_mut().query_mut()),
        View::Audit => {}
    }
}
