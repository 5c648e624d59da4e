//! Connection tester tests
//!
//! Verdict lifecycle: testing → success | error → cleared after the TTL.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use hashbridge::backend::fake::FakeBackend;
use hashbridge::backend::BackendError;
use hashbridge::console::Console;
use hashbridge::model::{TestResult, TestStatus};
use hashbridge::settings::Settings;

fn verdict(console: &Console) -> Option<TestStatus> {
    console.tester().result().map(|r| r.status)
}

fn settled(console: &Console) -> bool {
    verdict(console) != Some(TestStatus::Testing)
}

#[tokio::test(start_paused = true)]
async fn test_success_verdict_then_expiry() {
    let backend = Arc::new(FakeBackend::new());
    let mut console = Console::new(backend.clone(), &Settings::default());

    assert!(console.tester().result().is_none());
    console.test_connection();
    assert_eq!(verdict(&console), Some(TestStatus::Testing));
    assert_eq!(
        console.tester().result().unwrap().message,
        "Testing connections..."
    );

    console.run_until(settled).await;
    assert_eq!(verdict(&console), Some(TestStatus::Success));
    let received = Instant::now();

    console.run_until(|c| c.tester().result().is_none()).await;
    assert!(received.elapsed() >= Duration::from_secs(5));
    assert_eq!(backend.test_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_backend_error_verdict_passes_through() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_test(Ok(TestResult::error("MySQL Error: Access denied for user")));
    let mut console = Console::new(backend.clone(), &Settings::default());

    console.test_connection();
    console.run_until(settled).await;
    let result = console.tester().result().unwrap();
    assert_eq!(result.status, TestStatus::Error);
    assert_eq!(result.message, "MySQL Error: Access denied for user");
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_backend_gives_generic_error() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_test(Err(BackendError::Network("connection refused".to_string())));
    let mut console = Console::new(backend.clone(), &Settings::default());

    console.test_connection();
    console.run_until(settled).await;
    assert_eq!(console.tester().result(), Some(&TestResult::unreachable()));

    // Error verdicts expire too
    console.run_until(|c| c.tester().result().is_none()).await;
}

#[tokio::test(start_paused = true)]
async fn test_stale_verdict_and_timer_never_clobber_newer_result() {
    let backend = Arc::new(FakeBackend::new());
    backend.set_latency(Duration::from_secs(2));
    backend.push_test(Ok(TestResult::error("first")));
    backend.push_test(Ok(TestResult {
        status: TestStatus::Success,
        message: "second".to_string(),
    }));
    let mut console = Console::new(backend.clone(), &Settings::default());

    console.test_connection();
    tokio::time::sleep(Duration::from_secs(1)).await;
    console.test_connection();
    assert_eq!(console.tester().invocation(), 2);

    // The first answer lands at +2s and is discarded
    console.run_until(settled).await;
    assert_eq!(console.tester().result().unwrap().message, "second");
    let received = Instant::now();

    tokio::time::sleep(Duration::from_secs(4)).await;
    console.drain();
    assert_eq!(console.tester().result().unwrap().message, "second");

    console.run_until(|c| c.tester().result().is_none()).await;
    assert!(received.elapsed() >= Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_retest_restarts_expiry() {
    let backend = Arc::new(FakeBackend::new());
    let mut console = Console::new(backend.clone(), &Settings::default());

    console.test_connection();
    console.run_until(settled).await;
    tokio::time::sleep(Duration::from_secs(4)).await;
    console.drain();

    console.test_connection();
    console.run_until(settled).await;
    let second = Instant::now();

    // The first timer would have fired 1s from now; it was aborted
    tokio::time::sleep(Duration::from_secs(2)).await;
    console.drain();
    assert_eq!(verdict(&console), Some(TestStatus::Success));

    console.run_until(|c| c.tester().result().is_none()).await;
    assert!(second.elapsed() >= Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_invalid_port_fails_without_request() {
    let backend = Arc::new(FakeBackend::new());
    let mut console = Console::new(backend.clone(), &Settings::default());
    console.set_field("postgres_port", "abc").unwrap();

    console.test_connection();
    let result = console.tester().result().unwrap();
    assert_eq!(result.status, TestStatus::Error);
    assert!(result.message.contains("postgres_port"), "{}", result.message);
    assert_eq!(backend.test_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_custom_ttl() {
    let backend = Arc::new(FakeBackend::new());
    let mut settings = Settings::default();
    settings.notifications.test_result_ttl_secs = 1;
    let mut console = Console::new(backend.clone(), &settings);

    console.test_connection();
    console.run_until(settled).await;
    let received = Instant::now();
    console.run_until(|c| c.tester().result().is_none()).await;
    let waited = received.elapsed();
    assert!(waited >= Duration::from_secs(1) && waited < Duration::from_secs(2));
}
