//! Integration tests for the scan controller against simulated search APIs.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod support;

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use cookie_monitor::{
    CookieRecord, CursorStore, MemoryCursorStore, RemediationError, Remediator, ScanController,
    ScanFilters, ScanOptions, ScanRequest,
};
use tokio_util::sync::CancellationToken;

use support::{HangingRemediator, PathVerifier, RecordingRemediator, ScriptedSource, cursor};

fn request() -> ScanRequest {
    ScanRequest::new(ScanFilters::new("scatterholt.com", "session"))
}

fn no_delay() -> ScanOptions {
    ScanOptions {
        page_delay: Duration::ZERO,
        ..ScanOptions::default()
    }
}

#[tokio::test]
async fn test_two_page_scenario_saves_once_and_skips_rejected_cookie() {
    let source = Arc::new(
        ScriptedSource::new()
            .page(None, Some("tok1"), &["/a", "/b"])
            .page(Some("tok1"), None, &["/c"]),
    );
    let store = Arc::new(MemoryCursorStore::new());
    let verifier = Arc::new(PathVerifier::rejecting(&["/b"]));
    let remediator = Arc::new(RecordingRemediator::default());
    let controller = ScanController::new(
        source.clone(),
        store.clone(),
        verifier.clone(),
        remediator.clone(),
        no_delay(),
    );

    let report = controller
        .run_scan(&request(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(store.history().await, vec![cursor("tok1")]);
    assert_eq!(store.get().await.unwrap(), Some(cursor("tok1")));
    assert_eq!(verifier.calls(), vec!["/a", "/b", "/c"]);
    assert_eq!(remediator.calls(), vec!["/a", "/c"]);
    assert_eq!(report.pages, 2);
    assert_eq!(report.fetched, 3);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.remediated, 2);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_verification_error_is_recorded_and_record_not_remediated() {
    let source = Arc::new(
        ScriptedSource::new()
            .page(None, Some("tok1"), &["/a", "/b"])
            .page(Some("tok1"), None, &["/c"]),
    );
    let verifier = Arc::new(PathVerifier::failing(&["/a"]));
    let remediator = Arc::new(RecordingRemediator::default());
    let controller = ScanController::new(
        source,
        Arc::new(MemoryCursorStore::new()),
        verifier.clone(),
        remediator.clone(),
        no_delay(),
    );

    let report = controller
        .run_scan(&request(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(verifier.calls(), vec!["/a", "/b", "/c"]);
    assert_eq!(remediator.calls(), vec!["/b", "/c"]);
    assert_eq!(report.failures.len(), 1);
    assert!(
        matches!(&report.failures[0], RemediationError::Verify { record, .. } if record.path == "/a"),
        "unexpected failure: {:?}",
        report.failures[0]
    );
    assert_eq!(report.remediated, 2);
    assert_eq!(report.skipped, 0);
}

#[tokio::test]
async fn test_null_next_on_second_page_means_exactly_two_fetches() {
    let source = Arc::new(
        ScriptedSource::new()
            .page(None, Some("tok1"), &["/a"])
            .page(Some("tok1"), None, &["/b"])
            .page(Some("never"), None, &["/z"]),
    );
    let controller = ScanController::new(
        source.clone(),
        Arc::new(MemoryCursorStore::new()),
        Arc::new(PathVerifier::default()),
        Arc::new(RecordingRemediator::default()),
        no_delay(),
    );

    controller
        .run_scan(&request(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        source.requested_from(),
        vec![None, Some("tok1".to_string())]
    );
}

#[tokio::test]
async fn test_resumes_from_persisted_cursor() {
    let source = Arc::new(
        ScriptedSource::new()
            .page(None, Some("tok1"), &["/old"])
            .page(Some("tok1"), Some("tok2"), &["/new"])
            .page(Some("tok2"), None, &["/newest"]),
    );
    let store = Arc::new(MemoryCursorStore::with_cursor(cursor("tok1")));
    let remediator = Arc::new(RecordingRemediator::default());
    let controller = ScanController::new(
        source.clone(),
        store.clone(),
        Arc::new(PathVerifier::default()),
        remediator.clone(),
        no_delay(),
    );

    let report = controller
        .run_scan(&request(), &CancellationToken::new())
        .await
        .unwrap();

    let requested = source.requested_from();
    assert_eq!(requested.first(), Some(&Some("tok1".to_string())));
    assert!(!requested.contains(&None), "must never restart from the beginning");
    assert_eq!(remediator.calls(), vec!["/new", "/newest"]);
    assert_eq!(report.starting_cursor, Some(cursor("tok1")));
    assert_eq!(store.get().await.unwrap(), Some(cursor("tok2")));
}

#[tokio::test]
async fn test_crash_mid_page_resumes_at_following_page() {
    let source = Arc::new(
        ScriptedSource::new()
            .page(None, Some("tok1"), &["/p1"])
            .page(Some("tok1"), Some("tok2"), &["/p2a", "/p2b"])
            .page(Some("tok2"), None, &["/p3"]),
    );
    let store = Arc::new(MemoryCursorStore::new());
    let crashing = Arc::new(HangingRemediator::on("/p2a"));
    let controller = Arc::new(ScanController::new(
        source.clone(),
        store.clone(),
        Arc::new(PathVerifier::default()),
        crashing.clone(),
        no_delay(),
    ));

    let run = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move {
            controller
                .run_scan(&request(), &CancellationToken::new())
                .await
        })
    };
    crashing.reached.notified().await;
    run.abort();
    let _ = run.await;

    // Page 2's cursor was persisted before its records were processed.
    assert_eq!(store.get().await.unwrap(), Some(cursor("tok2")));
    assert_eq!(crashing.calls(), vec!["/p1"]);

    let restart_source = Arc::new(
        ScriptedSource::new()
            .page(None, Some("tok1"), &["/p1"])
            .page(Some("tok1"), Some("tok2"), &["/p2a", "/p2b"])
            .page(Some("tok2"), None, &["/p3"]),
    );
    let remediator = Arc::new(RecordingRemediator::default());
    let restarted = ScanController::new(
        restart_source.clone(),
        store.clone(),
        Arc::new(PathVerifier::default()),
        remediator.clone(),
        no_delay(),
    );
    restarted
        .run_scan(&request(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        restart_source.requested_from(),
        vec![Some("tok2".to_string())],
        "restart must begin at page 3, not page 2"
    );
    assert_eq!(remediator.calls(), vec!["/p3"]);
}

#[tokio::test]
async fn test_consecutive_fetches_are_throttled() {
    let delay = Duration::from_millis(40);
    let source = Arc::new(
        ScriptedSource::new()
            .page(None, Some("tok1"), &["/a"])
            .page(Some("tok1"), Some("tok2"), &["/b"])
            .page(Some("tok2"), None, &["/c"]),
    );
    let controller = ScanController::new(
        source.clone(),
        Arc::new(MemoryCursorStore::new()),
        Arc::new(PathVerifier::default()),
        Arc::new(RecordingRemediator::default()),
        ScanOptions {
            page_delay: delay,
            ..ScanOptions::default()
        },
    );

    controller
        .run_scan(&request(), &CancellationToken::new())
        .await
        .unwrap();

    let times = source.request_times();
    assert_eq!(times.len(), 3);
    for pair in times.windows(2) {
        let gap = pair[1].duration_since(pair[0]);
        assert!(gap >= delay, "fetches only {gap:?} apart, expected >= {delay:?}");
    }
}

#[tokio::test]
async fn test_excluding_expired_sends_expires_after_now() {
    let source = Arc::new(ScriptedSource::new());
    let controller = ScanController::new(
        source.clone(),
        Arc::new(MemoryCursorStore::new()),
        Arc::new(PathVerifier::default()),
        Arc::new(RecordingRemediator::default()),
        no_delay(),
    );

    let before = Utc::now();
    controller
        .run_scan(&request().include_expired(false), &CancellationToken::new())
        .await
        .unwrap();
    let after = Utc::now();

    let query = source.queries().remove(0);
    let expires_after = query.expires_after.expect("expires_after must be set");
    assert!(expires_after >= before && expires_after <= after);
}

#[tokio::test]
async fn test_including_expired_omits_expires_after_and_sets_import_window() {
    let source = Arc::new(ScriptedSource::new());
    let controller = ScanController::new(
        source.clone(),
        Arc::new(MemoryCursorStore::new()),
        Arc::new(PathVerifier::default()),
        Arc::new(RecordingRemediator::default()),
        no_delay(),
    );

    let before = Utc::now();
    controller
        .run_scan(
            &request()
                .include_expired(true)
                .imported_within(TimeDelta::days(90)),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let query = source.queries().remove(0);
    assert!(query.expires_after.is_none());
    let imported_after = query.imported_after.expect("imported_after must be set");
    let age = before - imported_after;
    assert!(age <= TimeDelta::days(90) && age > TimeDelta::days(90) - TimeDelta::seconds(5));
    assert_eq!(query.names, vec!["session".to_string()]);
    assert_eq!(query.size, 50);
}

#[tokio::test]
async fn test_empty_first_page_completes_without_saving() {
    let source = Arc::new(ScriptedSource::new().page(None, Some("tok1"), &[]));
    let store = Arc::new(MemoryCursorStore::new());
    let controller = ScanController::new(
        source.clone(),
        store.clone(),
        Arc::new(PathVerifier::default()),
        Arc::new(RecordingRemediator::default()),
        no_delay(),
    );

    let report = controller
        .run_scan(&request(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.pages, 0);
    assert!(store.history().await.is_empty());
    assert_eq!(source.requested_from().len(), 1);
}

#[tokio::test]
async fn test_cancellation_lets_current_page_finish() {
    let source = Arc::new(
        ScriptedSource::new()
            .page(None, Some("tok1"), &["/a", "/b"])
            .page(Some("tok1"), None, &["/c"]),
    );
    let store = Arc::new(MemoryCursorStore::new());
    let cancel = CancellationToken::new();

    struct CancelOnFirst {
        cancel: CancellationToken,
        inner: RecordingRemediator,
    }

    #[async_trait::async_trait]
    impl Remediator for CancelOnFirst {
        async fn remediate(&self, record: &CookieRecord) -> Result<(), RemediationError> {
            self.cancel.cancel();
            self.inner.remediate(record).await
        }
    }

    let remediator = Arc::new(CancelOnFirst {
        cancel: cancel.clone(),
        inner: RecordingRemediator::default(),
    });
    let controller = ScanController::new(
        source.clone(),
        store.clone(),
        Arc::new(PathVerifier::default()),
        remediator.clone(),
        no_delay(),
    );

    let report = controller.run_scan(&request(), &cancel).await.unwrap();

    assert!(report.was_cancelled());
    assert_eq!(remediator.inner.calls(), vec!["/a", "/b"]);
    assert_eq!(source.requested_from(), vec![None]);
    assert_eq!(store.get().await.unwrap(), Some(cursor("tok1")));
}
