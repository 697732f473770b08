//! Submission driver tests against in-memory backends
//!
//! Delays are zero unless a test is about pacing or cancellation.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use wowm_import::client::{AddItemRequest, AddItemResponse, ClientError, ItemCreator, ListingRefresher};
use wowm_import::driver::{DriverSettings, ImportDriver};
use wowm_import::prompt::{AssumeYes, Confirmer};
use wowm_import::session::ImportCounts;
use wowm_import::{parse_import_text, ImportError, ImportRecord};

// ============================================================================
// Test doubles
// ============================================================================

/// Replays scripted responses and remembers every request
#[derive(Default)]
struct ScriptedCreator {
    responses: Mutex<VecDeque<Result<AddItemResponse, ClientError>>>,
    requests: Mutex<Vec<AddItemRequest>>,
}

impl ScriptedCreator {
    fn new(responses: Vec<Result<AddItemResponse, ClientError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn request_names(&self) -> Vec<String> {
        self.requests.lock().unwrap().iter().map(|r| r.name.clone()).collect()
    }

    fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ItemCreator for ScriptedCreator {
    async fn create_item(&self, request: &AddItemRequest) -> Result<AddItemResponse, ClientError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(created()))
    }
}

/// Blocks inside the first submission until released
#[derive(Default)]
struct GatedCreator {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl ItemCreator for GatedCreator {
    async fn create_item(&self, _request: &AddItemRequest) -> Result<AddItemResponse, ClientError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(created())
    }
}

/// Cancels the run once `after` submissions have been made
struct CancellingCreator {
    calls: AtomicUsize,
    after: usize,
    token: CancellationToken,
}

#[async_trait]
impl ItemCreator for CancellingCreator {
    async fn create_item(&self, _request: &AddItemRequest) -> Result<AddItemResponse, ClientError> {
        let calls = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if calls == self.after {
            self.token.cancel();
        }
        Ok(created())
    }
}

#[derive(Default)]
struct CountingRefresher {
    refreshes: AtomicUsize,
}

#[async_trait]
impl ListingRefresher for CountingRefresher {
    async fn refresh_listing(&self) -> Result<(), ClientError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Records how often it was asked and answers with `answer`
struct CountingConfirmer {
    asked: AtomicUsize,
    answer: bool,
}

impl CountingConfirmer {
    fn new(answer: bool) -> Self {
        Self {
            asked: AtomicUsize::new(0),
            answer,
        }
    }
}

#[async_trait]
impl Confirmer for CountingConfirmer {
    async fn confirm_large_batch(&self, _count: usize) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

/// Never answers, like an operator who walked away from the prompt
struct UnansweredConfirmer;

#[async_trait]
impl Confirmer for UnansweredConfirmer {
    async fn confirm_large_batch(&self, _count: usize) -> bool {
        std::future::pending().await
    }
}

fn created() -> AddItemResponse {
    AddItemResponse {
        ok: true,
        error: None,
        created_item: Some(true),
        profession_name: None,
    }
}

fn already_existed() -> AddItemResponse {
    AddItemResponse {
        ok: true,
        error: None,
        created_item: Some(false),
        profession_name: None,
    }
}

fn rejected(message: &str) -> AddItemResponse {
    AddItemResponse {
        ok: false,
        error: Some(message.to_string()),
        created_item: None,
        profession_name: None,
    }
}

fn no_delay() -> DriverSettings {
    DriverSettings {
        skip_delay: Duration::ZERO,
        submit_delay: Duration::ZERO,
        confirm_threshold: 100,
    }
}

fn batch(count: usize) -> Vec<ImportRecord> {
    let text: String = (1..=count).map(|i| format!("Item {}\n", i)).collect();
    parse_import_text(&text)
}

// ============================================================================
// Outcome accounting
// ============================================================================

#[tokio::test]
async fn test_network_failure_does_not_abort_batch() {
    let creator = Arc::new(ScriptedCreator::new(vec![
        Ok(created()),
        Err(ClientError::NetworkError("connection refused".to_string())),
        Ok(created()),
    ]));
    let driver = ImportDriver::new(creator.clone(), no_delay());

    let summary = driver
        .run(batch(3), &AssumeYes, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(creator.request_names(), vec!["Item 1", "Item 2", "Item 3"]);
    assert_eq!(
        summary.counts,
        ImportCounts {
            success: 2,
            skipped: 0,
            error: 1
        }
    );
    assert!(!summary.cancelled);
}

#[tokio::test]
async fn test_already_existing_item_counts_as_skipped() {
    let creator = Arc::new(ScriptedCreator::new(vec![
        Ok(created()),
        Ok(already_existed()),
        Ok(created()),
    ]));
    let driver = ImportDriver::new(creator, no_delay());

    let summary = driver
        .run(batch(3), &AssumeYes, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.counts.success, 2);
    assert_eq!(summary.counts.skipped, 1);
    assert_eq!(summary.counts.error, 0);
}

#[tokio::test]
async fn test_http_status_and_application_errors_are_counted() {
    let creator = Arc::new(ScriptedCreator::new(vec![
        Err(ClientError::ApiError(500, "boom".to_string())),
        Ok(rejected("invalid profession")),
        Err(ClientError::ParseError("expected value".to_string())),
        Ok(already_existed()),
    ]));
    let refresher = Arc::new(CountingRefresher::default());
    let driver = ImportDriver::new(creator.clone(), no_delay()).with_refresher(refresher.clone());

    let summary = driver
        .run(batch(4), &AssumeYes, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(creator.call_count(), 4);
    assert_eq!(
        summary.counts,
        ImportCounts {
            success: 0,
            skipped: 1,
            error: 3
        }
    );
    assert_eq!(refresher.refreshes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_requests_carry_parsed_fields_in_order() {
    let creator = Arc::new(ScriptedCreator::default());
    let driver = ImportDriver::new(creator.clone(), no_delay());
    let records = parse_import_text("Poción,Alquimia\nGolden Statue,decor\nSword, of Doom\n");

    driver
        .run(records, &AssumeYes, &CancellationToken::new())
        .await
        .unwrap();

    let requests = creator.requests.lock().unwrap().clone();
    assert_eq!(
        requests,
        vec![
            AddItemRequest {
                name: "Poción".to_string(),
                is_decor: false,
                profession_name: Some("Alchemy".to_string()),
            },
            AddItemRequest {
                name: "Golden Statue".to_string(),
                is_decor: true,
                profession_name: None,
            },
            AddItemRequest {
                name: "Sword, of Doom".to_string(),
                is_decor: false,
                profession_name: None,
            },
        ]
    );
}

// ============================================================================
// Refresh after completion
// ============================================================================

#[tokio::test]
async fn test_refresh_after_successful_batch() {
    let creator = Arc::new(ScriptedCreator::default());
    let refresher = Arc::new(CountingRefresher::default());
    let driver = ImportDriver::new(creator, no_delay()).with_refresher(refresher.clone());

    let summary = driver
        .run(batch(2), &AssumeYes, &CancellationToken::new())
        .await
        .unwrap();

    assert!(summary.should_refresh());
    assert_eq!(refresher.refreshes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_no_refresh_when_everything_skipped() {
    let creator = Arc::new(ScriptedCreator::new(vec![Ok(already_existed()), Ok(already_existed())]));
    let refresher = Arc::new(CountingRefresher::default());
    let driver = ImportDriver::new(creator, no_delay()).with_refresher(refresher.clone());

    driver
        .run(batch(2), &AssumeYes, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(refresher.refreshes.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Confirmation
// ============================================================================

#[tokio::test]
async fn test_large_batch_declined_sends_nothing() {
    let creator = Arc::new(ScriptedCreator::default());
    let driver = ImportDriver::new(creator.clone(), no_delay());
    let confirmer = CountingConfirmer::new(false);

    let result = driver
        .run(batch(101), &confirmer, &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(ImportError::ConfirmationDeclined(101))));
    assert_eq!(confirmer.asked.load(Ordering::SeqCst), 1);
    assert_eq!(creator.call_count(), 0);
    assert!(!driver.is_active());
}

#[tokio::test]
async fn test_cancel_while_awaiting_confirmation() {
    let creator = Arc::new(ScriptedCreator::default());
    let driver = ImportDriver::new(creator.clone(), no_delay());
    let token = CancellationToken::new();

    tokio::spawn({
        let token = token.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        }
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        driver.run(batch(101), &UnansweredConfirmer, &token),
    )
    .await
    .expect("cancellation should end a pending confirmation");

    assert!(matches!(result, Err(ImportError::ConfirmationDeclined(101))));
    assert_eq!(creator.call_count(), 0);
    assert!(!driver.is_active());
}

#[tokio::test]
async fn test_large_batch_confirmed_runs() {
    let creator = Arc::new(ScriptedCreator::default());
    let driver = ImportDriver::new(creator.clone(), no_delay());
    let confirmer = CountingConfirmer::new(true);

    let summary = driver
        .run(batch(101), &confirmer, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(confirmer.asked.load(Ordering::SeqCst), 1);
    assert_eq!(creator.call_count(), 101);
    assert_eq!(summary.counts.success, 101);
}

#[tokio::test]
async fn test_threshold_batch_needs_no_confirmation() {
    let creator = Arc::new(ScriptedCreator::default());
    let driver = ImportDriver::new(creator.clone(), no_delay());
    let confirmer = CountingConfirmer::new(false);

    driver
        .run(batch(100), &confirmer, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(confirmer.asked.load(Ordering::SeqCst), 0);
    assert_eq!(creator.call_count(), 100);
}

// ============================================================================
// Session guard and cancellation
// ============================================================================

#[tokio::test]
async fn test_empty_batch_rejected() {
    let driver = ImportDriver::new(Arc::new(ScriptedCreator::default()), no_delay());
    let result = driver
        .run(Vec::new(), &AssumeYes, &CancellationToken::new())
        .await;
    assert!(matches!(result, Err(ImportError::EmptyBatch)));
}

#[tokio::test]
async fn test_second_import_refused_while_running() {
    let creator = Arc::new(GatedCreator::default());
    let driver = Arc::new(ImportDriver::new(creator.clone(), no_delay()));
    let token = CancellationToken::new();

    let first = tokio::spawn({
        let driver = driver.clone();
        let token = token.clone();
        async move { driver.run(batch(1), &AssumeYes, &token).await }
    });

    creator.entered.notified().await;
    assert!(driver.is_active());

    let second = driver.run(batch(1), &AssumeYes, &token).await;
    assert!(matches!(second, Err(ImportError::SessionActive)));

    creator.release.notify_one();
    let summary = first.await.unwrap().unwrap();
    assert_eq!(summary.counts.success, 1);
    assert!(!driver.is_active());

    // The driver accepts a new batch once the previous one is done
    creator.release.notify_one();
    let third = driver.run(batch(1), &AssumeYes, &token).await.unwrap();
    assert_eq!(third.counts.success, 1);
}

#[tokio::test]
async fn test_cancel_between_records() {
    let token = CancellationToken::new();
    let creator = Arc::new(CancellingCreator {
        calls: AtomicUsize::new(0),
        after: 2,
        token: token.clone(),
    });
    let refresher = Arc::new(CountingRefresher::default());
    let settings = DriverSettings {
        skip_delay: Duration::from_millis(10),
        submit_delay: Duration::from_millis(10),
        confirm_threshold: 100,
    };
    let driver = ImportDriver::new(creator.clone(), settings).with_refresher(refresher.clone());

    let summary = driver.run(batch(5), &AssumeYes, &token).await.unwrap();

    assert!(summary.cancelled);
    assert_eq!(creator.calls.load(Ordering::SeqCst), 2);
    assert_eq!(summary.counts.success, 2);
    assert_eq!(summary.total, 5);
    assert_eq!(refresher.refreshes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancelled_before_start_submits_nothing() {
    let creator = Arc::new(ScriptedCreator::default());
    let driver = ImportDriver::new(creator.clone(), no_delay());
    let token = CancellationToken::new();
    token.cancel();

    let summary = driver.run(batch(3), &AssumeYes, &token).await.unwrap();

    assert!(summary.cancelled);
    assert_eq!(creator.call_count(), 0);
    assert_eq!(summary.counts.processed(), 0);
}

#[tokio::test]
async fn test_inter_record_pause_is_applied() {
    let creator = Arc::new(ScriptedCreator::new(vec![Ok(created()), Ok(already_existed()), Ok(created())]));
    let settings = DriverSettings {
        skip_delay: Duration::from_millis(20),
        submit_delay: Duration::from_millis(60),
        confirm_threshold: 100,
    };
    let driver = ImportDriver::new(creator, settings);

    let start = std::time::Instant::now();
    driver
        .run(batch(3), &AssumeYes, &CancellationToken::new())
        .await
        .unwrap();

    // created -> 60ms, skipped -> 20ms, no pause after the last record
    assert!(start.elapsed() >= Duration::from_millis(80));
}
