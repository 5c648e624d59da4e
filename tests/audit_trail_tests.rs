//! Audit trail viewer tests

use serde_json::json;
use std::sync::Arc;

use hashbridge::backend::fake::FakeBackend;
use hashbridge::backend::BackendError;
use hashbridge::console::{AuditTrailViewer, Console, View};
use hashbridge::model::{AuditLogEntry, GENESIS_HASH};
use hashbridge::settings::Settings;
use hashbridge::ui::present::{audit_row, Tone};

const FIRST_HASH: &str = "21a88ec8b5be6f9deef2d7a56469f6f5f6af25dbf8f9f6c08451d8132a092eb9";
const SECOND_HASH: &str = "5e236f5db8f64aae0eafbfe19e50d52a8b01eb69c61de62b1ec177e410926aab";

fn chain() -> Vec<AuditLogEntry> {
    vec![
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
        },
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
        },
    ]
}

async fn booted(backend: &Arc<FakeBackend>) -> Console {
    let mut console = Console::new(backend.clone(), &Settings::default());
    console.boot();
    console.run_until(|c| !c.audit().is_loading()).await;
    console
}

#[tokio::test(start_paused = true)]
async fn test_boot_fetches_trail_once() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_audit(Ok(chain()));
    let console = booted(&backend).await;

    assert_eq!(backend.audit_calls(), 1);
    assert_eq!(console.audit().entries().len(), 2);
    assert_eq!(console.view(), View::Transfer);
}

#[tokio::test(start_paused = true)]
async fn test_display_order_is_reverse_of_arrival() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_audit(Ok(chain()));
    let console = booted(&backend).await;

    let hashes: Vec<&str> = console
        .audit()
        .entries()
        .iter()
        .map(|e| e.current_hash.as_str())
        .collect();
    assert_eq!(hashes, vec![SECOND_HASH, FIRST_HASH]);
}

#[tokio::test(start_paused = true)]
async fn test_chain_report_for_intact_trail() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_audit(Ok(chain()));
    let console = booted(&backend).await;

    let report = console.audit().chain().unwrap();
    assert!(report.is_intact(), "{:?}", report.findings);
    assert_eq!(report.summary(), "chain verified (2 entries)");
}

#[tokio::test(start_paused = true)]
async fn test_tampered_trail_is_reported_but_not_reordered() {
    let mut entries = chain();
    entries[0].data["record_count"] = json!(21);
    let backend = Arc::new(FakeBackend::new());
    backend.push_audit(Ok(entries));
    let console = booted(&backend).await;

    let report = console.audit().chain().unwrap();
    assert!(!report.is_intact());
    assert_eq!(console.audit().entries()[0].current_hash, SECOND_HASH);
    assert!(console
        .latest_notice()
        .unwrap()
        .text
        .contains("chain BROKEN"));
}

#[tokio::test(start_paused = true)]
async fn test_fetch_failure_keeps_previous_entries() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_audit(Ok(chain()));
    backend.push_audit(Err(BackendError::Network("connection refused".to_string())));
    let mut console = booted(&backend).await;

    console.refresh_audit();
    console.run_until(|c| !c.audit().is_loading()).await;

    assert_eq!(console.audit().entries().len(), 2);
    assert!(console.audit().last_error().is_some());
    assert_eq!(backend.audit_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_stale_fetch_is_discarded() {
    let backend = Arc::new(FakeBackend::new());
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let mut viewer = AuditTrailViewer::new(backend, tx);

    viewer.refresh();
    viewer.refresh();
    assert!(viewer.apply_fetched(1, Ok(chain())).is_none());
    assert!(viewer.is_loading());
    assert!(viewer.entries().is_empty());

    assert_eq!(viewer.apply_fetched(2, Ok(chain()[..1].to_vec())), Some(Ok(1)));
    assert!(!viewer.is_loading());
    assert_eq!(viewer.entries()[0].current_hash, FIRST_HASH);
}

#[tokio::test(start_paused = true)]
async fn test_rows_are_display_only_transformations() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_audit(Ok(chain()));
    let console = booted(&backend).await;

    let newest = &console.audit().entries()[0];
    let row = audit_row(newest);
    assert_eq!(row.previous_hash, format!("{}...", &FIRST_HASH[..16]));
    assert_eq!(row.current_hash, SECOND_HASH);
    assert_eq!(row.status, "FAIL");
    assert_eq!(row.tone, Tone::Error);
    assert_eq!(row.timestamp, "2025-03-02 08:00:00");

    // Stored entry keeps the full hash
    assert_eq!(newest.previous_hash, FIRST_HASH);
}
