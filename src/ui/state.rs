//! UI-only state
//!
//! Things the console core does not care about: which form field has
//! focus, how far the audit table is scrolled, whether to quit.

use crate::model::ConfigField;

#[derive(Debug, Clone, Default)]
pub struct UiState {
    focus: usize,
    audit_scroll: usize,
    should_quit: bool,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Focused form field
    pub fn focused_field(&self) -> ConfigField {
        ConfigField::ALL[self.focus % ConfigField::ALL.len()]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % ConfigField::ALL.len();
    }

    pub fn focus_prev(&mut self) {
        let len = ConfigField::ALL.len();
        self.focus = (self.focus + len - 1) % len;
    }

    pub fn audit_scroll(&self) -> usize {
        self.audit_scroll
    }

    /// Scroll offset valid for a table of `entries` rows
    pub fn audit_offset(&self, entries: usize) -> usize {
        self.audit_scroll.min(entries.saturating_sub(1))
    }

    pub fn scroll_up(&mut self) {
        self.audit_scroll = self.audit_scroll.saturating_sub(1);
    }

    /// Scroll down, never past the last entry
    pub fn scroll_down(&mut self, entries: usize) {
        self.audit_scroll = self.audit_offset(entries);
        if self.audit_scroll + 1 < entries {
            self.audit_scroll += 1;
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}
