//! Tracing subscriber setup
//!
//! The TUI owns the terminal, so interactive sessions log to a file through
//! a non-blocking appender. Headless commands log to stderr.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::settings::LoggingSettings;

/// Log file name inside the configured directory
pub const LOG_FILE: &str = "hashbridge.log";

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    File,
    Stderr,
}

/// `RUST_LOG` when set, otherwise the configured directive
pub fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new("hashbridge=info"))
}

/// Install the global subscriber
///
/// The returned guard flushes the file writer on drop; keep it alive for
/// the whole session. Installing twice is a no-op.
pub fn init(settings: &LoggingSettings, target: LogTarget) -> Option<WorkerGuard> {
    match target {
        LogTarget::File => {
            let appender = tracing_appender::rolling::never(&settings.directory, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let installed = tracing_subscriber::registry()
                .with(env_filter(settings))
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .try_init()
                .is_ok();
            installed.then_some(guard)
        }
        LogTarget::Stderr => {
            let _ = tracing_subscriber::registry()
                .with(env_filter(settings))
                .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
                .try_init();
            None
        }
    }
}

/// Full path of the TUI log file
pub fn log_file_path(settings: &LoggingSettings) -> std::path::PathBuf {
    Path::new(&settings.directory).join(LOG_FILE)
}
