//! Presentation rules
//!
//! Pure functions from console state to display values. Widgets in
//! `view.rs` only lay these out, which keeps the rules testable without a
//! terminal.

use serde_json::Value;

use crate::model::{
    AuditLogEntry, QueryOutcome, TestResult, TestStatus, TransferProgress, TransferStatus,
};

/// Shown for an empty tabular result
pub const NO_RECORDS: &str = "No records found.";

/// Header badge before any progress has been seen
pub const OFFLINE: &str = "offline";

/// Visible characters of a previous-hash
pub const PREVIOUS_HASH_PREFIX: usize = 16;

/// Colour family of a badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
    Warning,
    Neutral,
}

/// How a query outcome is shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultDisplay {
    Error(String),
    NoRecords,
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Pretty-printed JSON
    Structured(String),
}

pub fn present_outcome(outcome: &QueryOutcome) -> ResultDisplay {
    match outcome {
        QueryOutcome::Error(message) => ResultDisplay::Error(message.clone()),
        QueryOutcome::Rows(rows) if rows.is_empty() => ResultDisplay::NoRecords,
        QueryOutcome::Rows(rows) => {
            // Columns of the first row, then any key first seen later
            let mut header: Vec<String> = Vec::new();
            for row in rows {
                for (column, _) in row {
                    if !header.contains(column) {
                        header.push(column.clone());
                    }
                }
            }
            let rows = rows
                .iter()
                .map(|row| {
                    header
                        .iter()
                        .map(|column| {
                            row.iter()
                                .find(|(name, _)| name == column)
                                .map(|(_, value)| cell_text(value))
                                .unwrap_or_default()
                        })
                        .collect()
                })
                .collect();
            ResultDisplay::Table { header, rows }
        }
        QueryOutcome::Value(value) => ResultDisplay::Structured(
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
        ),
    }
}

/// String rendering of one cell
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One audit entry ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRow {
    pub timestamp: String,
    pub status: String,
    pub tone: Tone,
    pub current_hash: String,
    pub previous_hash: String,
}

pub fn audit_row(entry: &AuditLogEntry) -> AuditRow {
    let status = entry.transfer_status().to_string();
    AuditRow {
        timestamp: entry
            .recorded_at()
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| entry.timestamp.clone()),
        tone: status_tone(&status),
        status,
        current_hash: entry.current_hash.clone(),
        previous_hash: truncate_hash(&entry.previous_hash),
    }
}

/// PASS / FAIL badge tone
pub fn status_tone(status: &str) -> Tone {
    match status {
        "PASS" => Tone::Success,
        "FAIL" => Tone::Error,
        _ => Tone::Neutral,
    }
}

/// First 16 characters followed by `...`
pub fn truncate_hash(hash: &str) -> String {
    let prefix: String = hash.chars().take(PREVIOUS_HASH_PREFIX).collect();
    format!("{}...", prefix)
}

/// Header badge text
pub fn status_badge(progress: Option<&TransferProgress>) -> &'static str {
    progress.map_or(OFFLINE, |p| p.status.display_name())
}

pub fn status_badge_tone(progress: Option<&TransferProgress>) -> Tone {
    match progress.map(|p| p.status) {
        Some(TransferStatus::Completed) => Tone::Success,
        Some(TransferStatus::Failed) => Tone::Error,
        Some(TransferStatus::Running) => Tone::Warning,
        Some(TransferStatus::Idle) | None => Tone::Neutral,
    }
}

pub fn test_result_tone(result: &TestResult) -> Tone {
    match result.status {
        TestStatus::Testing => Tone::Neutral,
        TestStatus::Success => Tone::Success,
        TestStatus::Error => Tone::Error,
    }
}

/// Completed-job integrity summary (hashes shown in full)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSummary {
    pub hash_before: String,
    pub hash_after: String,
    pub integrity_passed: bool,
}

pub fn transfer_summary(progress: Option<&TransferProgress>) -> Option<TransferSummary> {
    let progress = progress?;
    let passed = progress.integrity_passed()?;
    let result = progress.result.as_ref()?;
    Some(TransferSummary {
        hash_before: result.hash_before.clone(),
        hash_after: result.hash_after.clone(),
        integrity_passed: passed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransferResult;
    use serde_json::json;

    fn rows(body: Value) -> QueryOutcome {
        QueryOutcome::from_response(true, body)
    }

    #[test]
    fn test_empty_array_is_no_records() {
        assert_eq!(present_outcome(&rows(json!([]))), ResultDisplay::NoRecords);
    }

    #[test]
    fn test_single_row_table() {
        let display = present_outcome(&rows(json!([{"id": 1, "name": "a"}])));
        assert_eq!(
            display,
            ResultDisplay::Table {
                header: vec!["id".to_string(), "name".to_string()],
                rows: vec![vec!["1".to_string(), "a".to_string()]],
            }
        );
    }

    #[test]
    fn test_heterogeneous_rows_union_columns() {
        let body: Value =
            serde_json::from_str(r#"[{"id":1,"name":"a"},{"id":2,"email":"b@x","name":null}]"#)
                .unwrap();
        match present_outcome(&rows(body)) {
            ResultDisplay::Table { header, rows } => {
                assert_eq!(header, vec!["id", "name", "email"]);
                assert_eq!(rows[0], vec!["1", "a", ""]);
                assert_eq!(rows[1], vec!["2", "null", "b@x"]);
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_cell_is_compact_json() {
        assert_eq!(cell_text(&json!({"a": [1, 2]})), r#"{"a":[1,2]}"#);
        assert_eq!(cell_text(&json!(true)), "true");
    }

    #[test]
    fn test_error_and_scalar_display() {
        assert_eq!(
            present_outcome(&rows(json!({"error": "syntax error"}))),
            ResultDisplay::Error("syntax error".to_string())
        );
        assert_eq!(
            present_outcome(&rows(json!(42))),
            ResultDisplay::Structured("42".to_string())
        );
    }

    #[test]
    fn test_structured_is_pretty_printed() {
        let display = present_outcome(&rows(json!({"message": "ok"})));
        assert_eq!(
            display,
            ResultDisplay::Structured("{\n  \"message\": \"ok\"\n}".to_string())
        );
    }

    #[test]
    fn test_previous_hash_truncation_is_display_only() {
        let entry = AuditLogEntry {
            timestamp: "2025-03-01T10:15:30.5".to_string(),
            previous_hash: "abcdef0123456789abcdef0123456789".to_string(),
            current_hash: "ffff0000ffff0000ffff0000ffff0000".to_string(),
            data: json!({"transfer_status": "FAIL"}),
        };
        let row = audit_row(&entry);
        assert_eq!(row.previous_hash, "abcdef0123456789...");
        assert_eq!(row.current_hash, entry.current_hash);
        assert_eq!(row.timestamp, "2025-03-01 10:15:30");
        assert_eq!(row.tone, Tone::Error);
        assert_eq!(entry.previous_hash.len(), 32);
    }

    #[test]
    fn test_status_tones() {
        assert_eq!(status_tone("PASS"), Tone::Success);
        assert_eq!(status_tone("FAIL"), Tone::Error);
        assert_eq!(status_tone("PARTIAL"), Tone::Neutral);
    }

    #[test]
    fn test_badge_offline_without_progress() {
        assert_eq!(status_badge(None), "offline");
    }

    #[test]
    fn test_transfer_summary_only_when_completed() {
        let mut progress = TransferProgress {
            status: TransferStatus::Completed,
            current_step: "done".to_string(),
            logs: vec![],
            result: Some(TransferResult {
                hash_before: "a".repeat(64),
                hash_after: "a".repeat(64),
                success: true,
                timestamp: None,
            }),
        };
        let summary = transfer_summary(Some(&progress)).unwrap();
        assert!(summary.integrity_passed);
        assert_eq!(summary.hash_before.len(), 64);

        progress.status = TransferStatus::Failed;
        assert!(transfer_summary(Some(&progress)).is_none());
    }
}
