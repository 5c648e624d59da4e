//! View router
//!
//! Three mutually exclusive views. Switching only changes what is shown;
//! in-flight work keeps running.

/// Console view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Transfer,
    Query,
    Audit,
}

impl View {
    pub const ALL: [View; 3] = [View::Transfer, View::Query, View::Audit];

    pub fn title(self) -> &'static str {
        match self {
            View::Transfer => "Transfer",
            View::Query => "Query",
            View::Audit => "Audit Trail",
        }
    }

    pub fn index(self) -> usize {
        match self {
            View::Transfer => 0,
            View::Query => 1,
            View::Audit => 2,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewRouter {
    current: View,
}

impl ViewRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> View {
        self.current
    }

    pub fn switch_to(&mut self, view: View) {
        self.current = view;
    }
}
