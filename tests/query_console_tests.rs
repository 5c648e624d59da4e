//! Query console tests

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use hashbridge::backend::fake::{query_error, query_ok, FakeBackend};
use hashbridge::backend::{BackendError, QueryResponse};
use hashbridge::console::{Console, ConsoleError, DEFAULT_QUERY};
use hashbridge::model::{QueryOutcome, QueryTarget};
use hashbridge::settings::Settings;
use hashbridge::ui::present::{present_outcome, ResultDisplay};

async fn run(console: &mut Console) -> ResultDisplay {
    console.execute_query().unwrap();
    assert!(console.query().is_loading());
    console.run_until(|c| !c.query().is_loading()).await;
    present_outcome(console.query().outcome().unwrap())
}

fn console_for(backend: &Arc<FakeBackend>) -> Console {
    Console::new(backend.clone(), &Settings::default())
}

#[tokio::test(start_paused = true)]
async fn test_default_statement_and_target() {
    let backend = Arc::new(FakeBackend::new());
    let console = console_for(&backend);
    assert_eq!(console.query().query(), DEFAULT_QUERY);
    assert_eq!(console.query().target(), QueryTarget::Source);
    assert!(console.query().outcome().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_rows_render_as_table() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_query(query_ok(json!([{"id": 1, "name": "a"}])));
    let mut console = console_for(&backend);

    assert_eq!(
        run(&mut console).await,
        ResultDisplay::Table {
            header: vec!["id".to_string(), "name".to_string()],
            rows: vec![vec!["1".to_string(), "a".to_string()]],
        }
    );
    assert_eq!(
        backend.last_query(),
        Some((QueryTarget::Source, DEFAULT_QUERY.to_string()))
    );
}

#[tokio::test(start_paused = true)]
async fn test_empty_result() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_query(query_ok(json!([])));
    let mut console = console_for(&backend);
    assert_eq!(run(&mut console).await, ResultDisplay::NoRecords);
}

#[tokio::test(start_paused = true)]
async fn test_backend_error_field() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_query(query_error("syntax error"));
    let mut console = console_for(&backend);
    assert_eq!(
        run(&mut console).await,
        ResultDisplay::Error("syntax error".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_scalar_result() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_query(query_ok(json!(42)));
    let mut console = console_for(&backend);
    assert_eq!(
        run(&mut console).await,
        ResultDisplay::Structured("42".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_http_error_without_error_field() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_query(Ok(QueryResponse {
        success: false,
        body: json!({"detail": "relation \"users\" does not exist"}),
    }));
    let mut console = console_for(&backend);
    match run(&mut console).await {
        ResultDisplay::Error(message) => assert!(message.contains("does not exist")),
        other => panic!("expected error, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_transport_failure_is_synthesized() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_query(Err(BackendError::Network("timed out".to_string())));
    let mut console = console_for(&backend);
    assert_eq!(
        run(&mut console).await,
        ResultDisplay::Error("Failed to execute query".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_second_execute_rejected_while_loading() {
    let backend = Arc::new(FakeBackend::new());
    backend.set_latency(Duration::from_secs(1));
    let mut console = console_for(&backend);

    console.execute_query().unwrap();
    assert_eq!(console.execute_query(), Err(ConsoleError::QueryInFlight));
    console.run_until(|c| !c.query().is_loading()).await;
    assert_eq!(backend.query_calls(), 1);
    assert_eq!(console.query().outcome(), Some(&QueryOutcome::Rows(vec![])));
}

#[tokio::test(start_paused = true)]
async fn test_target_switch_keeps_text_and_result() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_query(query_ok(json!([{"n": 1}])));
    backend.push_query(query_ok(json!([{"n": 2}])));
    let mut console = console_for(&backend);

    console.query_mut().set_query("SELECT n FROM t");
    run(&mut console).await;
    console.query_mut().toggle_target();

    assert_eq!(console.query().target(), QueryTarget::Destination);
    assert_eq!(console.query().query(), "SELECT n FROM t");
    assert!(console.query().outcome().is_some());

    run(&mut console).await;
    assert_eq!(
        backend.last_query(),
        Some((QueryTarget::Destination, "SELECT n FROM t".to_string()))
    );
}

#[tokio::test(start_paused = true)]
async fn test_invalid_port_reported_as_error_outcome() {
    let backend = Arc::new(FakeBackend::new());
    let mut console = console_for(&backend);
    console.set_field("mysql_port", "99999").unwrap();

    console.execute_query().unwrap();
    assert!(!console.query().is_loading());
    assert!(console.query().outcome().unwrap().is_error());
    assert_eq!(backend.query_calls(), 0);
}
