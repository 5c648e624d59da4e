//! Transfer job status as reported by `/progress`
//!
//! Lifecycle: Idle → Running → Completed | Failed

use serde::{Deserialize, Serialize};

/// Job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Idle,
    Running,
    Completed,
    Failed,
}

impl TransferStatus {
    /// Terminal for the current job (no further transitions)
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Completed | TransferStatus::Failed)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TransferStatus::Idle => "idle",
            TransferStatus::Running => "running",
            TransferStatus::Completed => "completed",
            TransferStatus::Failed => "failed",
        }
    }
}

/// Integrity verdict attached to a finished job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResult {
    #[serde(default)]
    pub hash_before: String,
    #[serde(default)]
    pub hash_after: String,
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Whole progress record; replaced on every poll tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferProgress {
    pub status: TransferStatus,
    #[serde(default)]
    pub current_step: String,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default)]
    pub result: Option<TransferResult>,
}

impl TransferProgress {
    /// Enforce "no result while running"
    ///
    /// The backend keeps the previous job's result around when a new job
    /// starts, so a running record may arrive with a stale verdict.
    pub fn normalized(mut self) -> Self {
        if self.status == TransferStatus::Running {
            self.result = None;
        }
        self
    }

    /// Integrity verdict, only meaningful once completed
    pub fn integrity_passed(&self) -> Option<bool> {
        match (&self.status, &self.result) {
            (TransferStatus::Completed, Some(result)) => Some(result.success),
            _ => None,
        }
    }
}
