//! CLI module
//!
//! Provides:
//! - Argument parsing (clap derive)
//! - Headless mode dispatch (test, transfer, status, audit, query, report)

pub mod args;
pub mod dispatch;

// Re-exports
pub use args::{Args, Mode};
pub use dispatch::{run_cli_mode, ExitCode};

use crate::backend::BackendError;
use crate::console::ConsoleError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Console(#[from] ConsoleError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Exit codes (deterministic)
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, Error>;
