//! Connection test verdict (transient)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Testing,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub status: TestStatus,
    #[serde(default)]
    pub message: String,
}

impl TestResult {
    pub fn testing() -> Self {
        Self {
            status: TestStatus::Testing,
            message: "Testing connections...".to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: TestStatus::Error,
            message: message.into(),
        }
    }

    /// Generic verdict when the request never completed
    pub fn unreachable() -> Self {
        Self::error("Failed to reach API")
    }

    pub fn is_success(&self) -> bool {
        self.status == TestStatus::Success
    }
}
