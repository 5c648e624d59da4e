//! Console events
//!
//! Spawned network tasks never touch console state. They report back with a
//! `ConsoleEvent` over an unbounded channel and the owner of the state
//! applies it in the main loop. Every event carries the counter value of the
//! operation that produced it so stale completions can be discarded.

use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::backend::BackendError;
use crate::model::{AuditLogEntry, QueryOutcome, TestResult, TransferProgress, TransferStatus};

/// Channel sender for console events
pub type EventSender = mpsc::UnboundedSender<ConsoleEvent>;
/// Channel receiver for console events
pub type EventReceiver = mpsc::UnboundedReceiver<ConsoleEvent>;

/// Why a polling session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStop {
    /// Job reached completed or failed
    Terminal(TransferStatus),
    /// A `/progress` request failed; progress keeps its last value
    TransportFailure(String),
    /// Configured poll limit reached
    LimitReached(u32),
    /// A resumed session found no job running
    NoActiveJob,
    /// Operator asked to stop
    Manual,
    /// Console shutting down
    Teardown,
}

impl PollStop {
    pub fn describe(&self) -> String {
        match self {
            PollStop::Terminal(status) => format!("job {}", status.display_name()),
            PollStop::TransportFailure(err) => format!("poll failed: {}", err),
            PollStop::LimitReached(n) => format!("limit of {} polls reached", n),
            PollStop::NoActiveJob => "no job running".to_string(),
            PollStop::Manual => "stopped by operator".to_string(),
            PollStop::Teardown => "console closed".to_string(),
        }
    }
}

/// Completion delivered from a spawned task
#[derive(Debug, Clone)]
pub enum ConsoleEvent {
    /// `/test-connection` verdict (or synthesized error)
    TestFinished { invocation: u64, result: TestResult },
    /// Expiry timer for a test verdict fired
    TestExpired { invocation: u64 },
    /// `/start-transfer` answered
    TransferSubmitted {
        submission: u64,
        outcome: Result<(), BackendError>,
    },
    /// One poll tick succeeded
    ProgressTick {
        session: u64,
        progress: TransferProgress,
    },
    /// The poll task ended on its own
    PollingStopped { session: u64, reason: PollStop },
    /// `/execute-query` answered (transport failures already synthesized)
    QueryFinished { request: u64, outcome: QueryOutcome },
    /// `/audit-logs` answered, entries in arrival order
    AuditFetched {
        request: u64,
        outcome: Result<Vec<AuditLogEntry>, BackendError>,
    },
    /// Report download finished
    ReportSaved {
        request: u64,
        outcome: Result<(PathBuf, usize), String>,
    },
}

impl ConsoleEvent {
    /// Short name for log lines
    pub fn kind(&self) -> &'static str {
        match self {
            ConsoleEvent::TestFinished { .. } => "test_finished",
            ConsoleEvent::TestExpired { .. } => "test_expired",
            ConsoleEvent::TransferSubmitted { .. } => "transfer_submitted",
            ConsoleEvent::ProgressTick { .. } => "progress_tick",
            ConsoleEvent::PollingStopped { .. } => "polling_stopped",
            ConsoleEvent::QueryFinished { .. } => "query_finished",
            ConsoleEvent::AuditFetched { .. } => "audit_fetched",
            ConsoleEvent::ReportSaved { .. } => "report_saved",
        }
    }
}
