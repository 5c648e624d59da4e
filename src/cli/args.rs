//! CLI argument parsing
//!
//! `hashbridge [--config PATH] [--base-url URL] [COMMAND]`; no command
//! starts the interactive console.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::model::QueryTarget;

/// Parsed CLI arguments
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(
    name = "hashbridge",
    version,
    about = "Operator console for hash-verified MySQL to PostgreSQL transfers"
)]
pub struct Args {
    /// Settings file (default: $HASHBRIDGE_CONFIG, then ./hashbridge.toml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overrides the settings file
    #[arg(long, value_name = "URL", global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub mode: Option<Mode>,
}

/// CLI modes
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Mode {
    /// Interactive terminal console (default)
    Tui,

    /// Test both configured connections
    Test,

    /// Start a transfer and follow it until it finishes
    Transfer {
        /// Return as soon as the job is accepted
        #[arg(long)]
        detach: bool,
    },

    /// Print the current job progress once
    Status,

    /// Print the audit trail, most recent first
    Audit {
        /// Re-verify the hash chain; exit non-zero if it is broken
        #[arg(long)]
        verify: bool,
    },

    /// Run one SQL statement
    Query {
        /// source (MySQL) or destination (Postgres)
        #[arg(long, short, default_value = "source")]
        target: QueryTarget,

        /// Statement text
        sql: String,
    },

    /// Download the PDF transfer report
    Report {
        /// Output file (default: report_path from settings)
        #[arg(long, short, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

impl Args {
    /// Parse from an explicit argument list
    pub fn parse_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args)
    }

    pub fn mode_or_default(&self) -> Mode {
        self.mode.clone().unwrap_or(Mode::Tui)
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self.mode_or_default(), Mode::Tui)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_is_tui() {
        let args = Args::parse_from_args(["hashbridge"]).unwrap();
        assert_eq!(args.mode_or_default(), Mode::Tui);
        assert!(args.is_interactive());
    }

    #[test]
    fn test_global_flags_after_command() {
        let args = Args::parse_from_args([
            "hashbridge",
            "status",
            "--base-url",
            "http://backend:8000",
        ])
        .unwrap();
        assert_eq!(args.mode, Some(Mode::Status));
        assert_eq!(args.base_url.as_deref(), Some("http://backend:8000"));
    }

    #[test]
    fn test_query_target() {
        let args =
            Args::parse_from_args(["hashbridge", "query", "--target", "destination", "SELECT 1"])
                .unwrap();
        assert_eq!(
            args.mode,
            Some(Mode::Query {
                target: QueryTarget::Destination,
                sql: "SELECT 1".to_string(),
            })
        );
    }

    #[test]
    fn test_bad_target_rejected() {
        assert!(Args::parse_from_args(["hashbridge", "query", "-t", "oracle", "SELECT 1"]).is_err());
    }
}
