//! Terminal console UI
//!
//! The UI is a surface over [`Console`](crate::console::Console):
//! - `input` decodes keys into actions
//! - `handlers` turns actions into console operations
//! - `present` holds the display rules
//! - `view` draws the frame

pub mod handlers;
pub mod input;
pub mod present;
pub mod state;
pub mod view;

pub use handlers::handle_action;
pub use input::{map_key_event, Action};
pub use state::UiState;
pub use view::{draw, render};

/// UI result type
pub type Result<T> = std::result::Result<T, Error>;

/// UI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Terminal event stream closed")]
    InputClosed,
}
