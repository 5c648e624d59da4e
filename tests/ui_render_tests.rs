//! Rendering tests against ratatui's TestBackend

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, Terminal};
use serde_json::json;
use std::sync::Arc;

use hashbridge::backend::fake::{progress, query_ok, FakeBackend};
use hashbridge::console::{Console, View};
use hashbridge::model::{AuditLogEntry, TransferStatus, GENESIS_HASH};
use hashbridge::settings::Settings;
use hashbridge::ui::{self, handle_action, map_key_event, UiState};

fn screen(console: &Console, ui: &UiState) -> String {
    let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
    ui::render(&mut terminal, console, ui).unwrap();
    let buffer = terminal.backend().buffer();
    let mut text = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            text.push_str(buffer[(x, y)].symbol());
        }
        text.push('\n');
    }
    text
}

fn press(console: &mut Console, ui: &mut UiState, code: KeyCode, modifiers: KeyModifiers) {
    if let Some(action) = map_key_event(console.view(), KeyEvent::new(code, modifiers)) {
        handle_action(console, ui, action);
    }
}

fn type_text(console: &mut Console, ui: &mut UiState, text: &str) {
    for c in text.chars() {
        press(console, ui, KeyCode::Char(c), KeyModifiers::NONE);
    }
}

#[test]
fn test_header_shows_offline_before_any_progress() {
    let console = Console::new(Arc::new(FakeBackend::new()), &Settings::default());
    let text = screen(&console, &UiState::new());
    assert!(text.contains("OFFLINE"));
    assert!(text.contains("F1 Transfer"));
    assert!(text.contains("SOURCE DATABASE"));
    assert!(text.contains("DESTINATION DATABASE"));
}

#[test]
fn test_password_is_masked() {
    let console = Console::new(Arc::new(FakeBackend::new()), &Settings::default());
    let text = screen(&console, &UiState::new());
    assert!(!text.contains("password"));
    assert!(text.contains("••••••••"));
}

#[test]
fn test_typing_edits_focused_field() {
    let mut console = Console::new(Arc::new(FakeBackend::new()), &Settings::default());
    let mut ui = UiState::new();

    // Focus mysql_port and replace 3306 with 5433
    press(&mut console, &mut ui, KeyCode::Tab, KeyModifiers::NONE);
    for _ in 0..4 {
        press(&mut console, &mut ui, KeyCode::Backspace, KeyModifiers::NONE);
    }
    type_text(&mut console, &mut ui, "5433");

    let config = console.config().config();
    assert_eq!(config.source.port.checked("mysql_port"), Ok(5433));
    assert!(screen(&console, &ui).contains("5433"));
}

#[tokio::test(start_paused = true)]
async fn test_progress_panel_after_completion() {
    let backend = Arc::new(FakeBackend::new());
    let mut done = progress(
        TransferStatus::Completed,
        "Transfer Pipeline Completed Successfully",
        &["Loaded 20 records"],
    );
    done.result = Some(hashbridge::model::TransferResult {
        hash_before: "e3".repeat(32),
        hash_after: "e3".repeat(32),
        success: true,
        timestamp: None,
    });
    backend.push_progress(Ok(done));
    let mut console = Console::new(backend.clone(), &Settings::default());
    let mut ui = UiState::new();

    press(&mut console, &mut ui, KeyCode::Char('s'), KeyModifiers::CONTROL);
    console.run_until(|c| c.transfer().status().is_some() && !c.transfer().is_polling()).await;

    let text = screen(&console, &ui);
    assert!(text.contains("COMPLETED"));
    assert!(text.contains("integrity check passed"));
    assert!(text.contains(&"e3".repeat(32)));
    assert!(text.contains("Loaded 20 records"));
    assert!(text.contains("download-report"));
}

#[tokio::test(start_paused = true)]
async fn test_query_view_result_table() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_query(query_ok(json!([{"id": 7, "email": "ops@example.com"}])));
    let mut console = Console::new(backend.clone(), &Settings::default());
    let mut ui = UiState::new();

    press(&mut console, &mut ui, KeyCode::F(2), KeyModifiers::NONE);
    assert_eq!(console.view(), View::Query);
    press(&mut console, &mut ui, KeyCode::Enter, KeyModifiers::NONE);
    type_text(&mut console, &mut ui, "-- check");
    assert!(console.query().query().ends_with("\n-- check"));

    press(&mut console, &mut ui, KeyCode::F(5), KeyModifiers::NONE);
    console.run_until(|c| !c.query().is_loading()).await;

    let text = screen(&console, &ui);
    assert!(text.contains("Source (MySQL)"));
    assert!(text.contains("email"));
    assert!(text.contains("ops@example.com"));
}

#[tokio::test(start_paused = true)]
async fn test_query_view_no_records() {
    let backend = Arc::new(FakeBackend::new());
    let mut console = Console::new(backend.clone(), &Settings::default());
    let mut ui = UiState::new();

    press(&mut console, &mut ui, KeyCode::F(2), KeyModifiers::NONE);
    press(&mut console, &mut ui, KeyCode::Char('o'), KeyModifiers::CONTROL);
    press(&mut console, &mut ui, KeyCode::Char('e'), KeyModifiers::CONTROL);
    console.run_until(|c| !c.query().is_loading()).await;

    let text = screen(&console, &ui);
    assert!(text.contains("Destination (Postgres)"));
    assert!(text.contains("No records found."));
}

#[tokio::test(start_paused = true)]
async fn test_audit_view_truncates_previous_hash() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_audit(Ok(vec![AuditLogEntry {
        timestamp: "2025-03-01T10:15:30.123456".to_string(),
        previous_hash: GENESIS_HASH.to_string(),
        current_hash: "9f".repeat(32),
        data: json!({"transfer_status": "PASS"}),
    }]));
    let mut console = Console::new(backend.clone(), &Settings::default());
    let mut ui = UiState::new();
    console.boot();
    console.run_until(|c| !c.audit().is_loading()).await;

    press(&mut console, &mut ui, KeyCode::F(3), KeyModifiers::NONE);
    let text = screen(&console, &ui);
    assert!(text.contains("2025-03-01 10:15:30"));
    assert!(text.contains("PASS"));
    assert!(text.contains(&"9f".repeat(32)));
    assert!(text.contains("0000000000000000..."));
    assert!(!text.contains(&"0".repeat(17)));
}

#[test]
fn test_quit_key() {
    let mut console = Console::new(Arc::new(FakeBackend::new()), &Settings::default());
    let mut ui = UiState::new();
    press(&mut console, &mut ui, KeyCode::Char('q'), KeyModifiers::CONTROL);
    assert!(ui.should_quit());
}

fn audit_entry(status: &str, hash: &str) -> AuditLogEntry {
    AuditLogEntry {
        timestamp: "2025-03-01T10:15:30".to_string(),
        previous_hash: GENESIS_HASH.to_string(),
        current_hash: hash.repeat(32),
        data: json!({"transfer_status": status}),
    }
}

#[tokio::test(start_paused = true)]
async fn test_audit_scroll_survives_shorter_trail() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_audit(Ok(vec![
        audit_entry("PASS", "a1"),
        audit_entry("PASS", "b2"),
        audit_entry("FAIL", "c3"),
    ]));
    backend.push_audit(Ok(vec![audit_entry("PASS", "d4")]));
    let mut console = Console::new(backend.clone(), &Settings::default());
    let mut ui = UiState::new();
    console.boot();
    console.run_until(|c| !c.audit().is_loading()).await;

    press(&mut console, &mut ui, KeyCode::F(3), KeyModifiers::NONE);
    press(&mut console, &mut ui, KeyCode::Down, KeyModifiers::NONE);
    press(&mut console, &mut ui, KeyCode::Down, KeyModifiers::NONE);
    assert_eq!(ui.audit_scroll(), 2);

    press(&mut console, &mut ui, KeyCode::Char('r'), KeyModifiers::CONTROL);
    console.run_until(|c| !c.audit().is_loading()).await;
    assert_eq!(console.audit().entries().len(), 1);

    let text = screen(&console, &ui);
    assert!(text.contains(&"d4".repeat(32)));
}
