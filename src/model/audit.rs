//! Hash-chained audit log entries
//!
//! The backend appends one entry per finished transfer. Each entry's
//! `current_hash` is SHA-256 over the canonical JSON of
//! `{timestamp, previous_hash, data}`; the first entry links to
//! [`GENESIS_HASH`]. The console never rewrites entries. [`verify_chain`]
//! re-derives linkage and digests for display only.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::io;

/// `previous_hash` of the first entry in a chain
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// One audit record, exactly as the backend stored it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub timestamp: String,
    pub previous_hash: String,
    pub current_hash: String,
    #[serde(default)]
    pub data: Value,
}

impl AuditLogEntry {
    /// `data.transfer_status` (PASS / FAIL in the reference backend)
    pub fn transfer_status(&self) -> &str {
        self.data
            .get("transfer_status")
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN")
    }

    /// Parsed timestamp; the backend writes naive ISO-8601 local time
    pub fn recorded_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(&self.timestamp)
                    .ok()
                    .map(|dt| dt.naive_local())
            })
    }

    /// Digest this entry should carry given its own content
    pub fn expected_hash(&self) -> String {
        let mut content = Map::new();
        content.insert("data".to_string(), self.data.clone());
        content.insert(
            "previous_hash".to_string(),
            Value::String(self.previous_hash.clone()),
        );
        content.insert(
            "timestamp".to_string(),
            Value::String(self.timestamp.clone()),
        );
        let canonical = canonical_json(&Value::Object(content));
        hex::encode(Sha256::digest(canonical.as_bytes()))
    }
}

/// Problem found while walking the chain (indices are arrival order, 0-based)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainFinding {
    /// First entry does not link to the genesis sentinel
    BadGenesis { index: usize, found: String },
    /// `previous_hash` differs from the predecessor's `current_hash`
    BrokenLink {
        index: usize,
        expected: String,
        found: String,
    },
    /// Recorded digest does not match the entry's content
    DigestMismatch {
        index: usize,
        recorded: String,
        computed: String,
    },
}

impl ChainFinding {
    pub fn describe(&self) -> String {
        match self {
            ChainFinding::BadGenesis { index, .. } => {
                format!("entry #{} does not start from the genesis hash", index + 1)
            }
            ChainFinding::BrokenLink { index, .. } => {
                format!("entry #{} does not link to its predecessor", index + 1)
            }
            ChainFinding::DigestMismatch { index, .. } => {
                format!("entry #{} content does not match its hash", index + 1)
            }
        }
    }
}

/// Outcome of [`verify_chain`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChainReport {
    pub entries: usize,
    pub findings: Vec<ChainFinding>,
}

impl ChainReport {
    pub fn is_intact(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn summary(&self) -> String {
        match self.findings.first() {
            None if self.entries == 0 => "chain empty".to_string(),
            None => format!("chain verified ({} entries)", self.entries),
            Some(first) if self.findings.len() == 1 => {
                format!("chain BROKEN: {}", first.describe())
            }
            Some(first) => format!(
                "chain BROKEN: {} (+{} more)",
                first.describe(),
                self.findings.len() - 1
            ),
        }
    }
}

/// Walk entries in arrival (oldest-first) order
pub fn verify_chain(entries: &[AuditLogEntry]) -> ChainReport {
    let mut findings = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        match index.checked_sub(1).map(|prev| &entries[prev]) {
            None => {
                if entry.previous_hash != GENESIS_HASH {
                    findings.push(ChainFinding::BadGenesis {
                        index,
                        found: entry.previous_hash.clone(),
                    });
                }
            }
            Some(prev) => {
                if entry.previous_hash != prev.current_hash {
                    findings.push(ChainFinding::BrokenLink {
                        index,
                        expected: prev.current_hash.clone(),
                        found: entry.previous_hash.clone(),
                    });
                }
            }
        }
        let computed = entry.expected_hash();
        if !computed.eq_ignore_ascii_case(&entry.current_hash) {
            findings.push(ChainFinding::DigestMismatch {
                index,
                recorded: entry.current_hash.clone(),
                computed,
            });
        }
    }
    ChainReport {
        entries: entries.len(),
        findings,
    }
}

/// Serialize with sorted keys, `", "` / `": "` separators and ASCII-only
/// output, matching the digest input the backend produces.
pub fn canonical_json(value: &Value) -> String {
    let sorted = sort_keys(value);
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, SpacedAsciiFormatter);
    // Writing into a Vec cannot fail and a Value always serializes
    if sorted.serialize(&mut ser).is_err() {
        return String::new();
    }
    String::from_utf8(out).unwrap_or_default()
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), sort_keys(&map[key.as_str()]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

struct SpacedAsciiFormatter;

impl serde_json::ser::Formatter for SpacedAsciiFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIRST_HASH: &str = "21a88ec8b5be6f9deef2d7a56469f6f5f6af25dbf8f9f6c08451d8132a092eb9";
    const SECOND_HASH: &str = "5e236f5db8f64aae0eafbfe19e50d52a8b01eb69c61de62b1ec177e410926aab";

    fn first_entry() -> AuditLogEntry {
        AuditLogEntry {
            timestamp: "2025-03-01T10:15:30.123456".to_string(),
            previous_hash: GENESIS_HASH.to_string(),
            current_hash: FIRST_HASH.to_string(),
            data: json!({
                "username": "user",
                "source_database": "source_db",
                "destination_database": "target_db",
                "record_count": 20,
                "hash_before": "ab12",
                "hash_after": "ab12",
                "transfer_status": "PASS"
            }),
        }
    }

    fn second_entry() -> AuditLogEntry {
        AuditLogEntry {
            timestamp: "2025-03-02T08:00:00".to_string(),
            previous_hash: FIRST_HASH.to_string(),
            current_hash: SECOND_HASH.to_string(),
            data: json!({
                "username": "josé",
                "record_count": 20,
                "transfer_status": "FAIL",
                "hash_before": "ab12",
                "hash_after": "cd34"
            }),
        }
    }

    #[test]
    fn test_canonical_json_layout() {
        let value = json!({"b": [1, 2], "a": {"y": "é", "x": null}});
        assert_eq!(
            canonical_json(&value),
            r#"{"a": {"x": null, "y": "\u00e9"}, "b": [1, 2]}"#
        );
    }

    #[test]
    fn test_expected_hash_matches_backend_digest() {
        assert_eq!(first_entry().expected_hash(), FIRST_HASH);
        assert_eq!(second_entry().expected_hash(), SECOND_HASH);
    }

    #[test]
    fn test_intact_chain() {
        let report = verify_chain(&[first_entry(), second_entry()]);
        assert!(report.is_intact(), "{:?}", report.findings);
        assert_eq!(report.summary(), "chain verified (2 entries)");
    }

    #[test]
    fn test_tampered_content_is_detected() {
        let mut tampered = second_entry();
        tampered.data["transfer_status"] = json!("PASS");
        let report = verify_chain(&[first_entry(), tampered]);
        assert_eq!(report.findings.len(), 1);
        assert!(matches!(
            report.findings[0],
            ChainFinding::DigestMismatch { index: 1, .. }
        ));
    }

    #[test]
    fn test_reordered_chain_breaks_links() {
        let report = verify_chain(&[second_entry(), first_entry()]);
        assert!(!report.is_intact());
        assert!(report
            .findings
            .iter()
            .any(|f| matches!(f, ChainFinding::BadGenesis { index: 0, .. })));
        assert!(report
            .findings
            .iter()
            .any(|f| matches!(f, ChainFinding::BrokenLink { index: 1, .. })));
    }

    #[test]
    fn test_status_and_timestamp_accessors() {
        let entry = first_entry();
        assert_eq!(entry.transfer_status(), "PASS");
        let at = entry.recorded_at().unwrap();
        assert_eq!(at.format("%Y-%m-%d %H:%M:%S").to_string(), "2025-03-01 10:15:30");

        let mut odd = second_entry();
        odd.data = json!({});
        odd.timestamp = "yesterday".to_string();
        assert_eq!(odd.transfer_status(), "UNKNOWN");
        assert!(odd.recorded_at().is_none());
    }

    #[test]
    fn test_empty_chain_summary() {
        assert_eq!(verify_chain(&[]).summary(), "chain empty");
    }
}
