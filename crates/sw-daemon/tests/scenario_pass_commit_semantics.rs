//! Scenario: a full pass (fetch -> detect -> notify -> commit).
//!
//! # Invariants under test
//!
//! 1. First pass sends the monitoring-started notice, announces no orders and
//!    commits the baseline marker.
//! 2. New orders are announced oldest first and the marker moves to page[0].
//! 3. A failed send does not roll back the marker (at-least-once per attempt,
//!    no re-announcement next pass).
//! 4. A failed monitoring-started notice still commits the baseline.
//! 5. Every fetch failure leaves the state exactly as it was.
//! 6. A feed call that overruns the call timeout is a transport failure.
//! 7. The runner asks the feed for exactly the configured page size.
//!
//! All collaborators are in-memory fakes from sw-testkit.

use std::sync::Arc;
use std::time::Duration;

use sw_daemon::pass::{PassError, PassOutcome, PassRunner};
use sw_detect::DetectorState;
use sw_feed::FeedError;
use sw_notify::{Notifier, MONITORING_STARTED_TEXT};
use sw_schemas::OrderId;
use sw_testkit::{page, RecordingSink, ScriptedFeed};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn runner(feed: &Arc<ScriptedFeed>, sink: &Arc<RecordingSink>, timeout: Duration) -> PassRunner {
    PassRunner::new(
        feed.clone(),
        Notifier::new(sink.clone(), timeout),
        10,
        timeout,
    )
}

fn marker(id: &str) -> DetectorState {
    DetectorState::with_marker(OrderId::from(id))
}

// ---------------------------------------------------------------------------
// 1. Baseline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_pass_records_baseline_and_sends_notice_only() {
    let feed = Arc::new(ScriptedFeed::always(page(&["o3", "o2", "o1"])));
    let sink = Arc::new(RecordingSink::new());
    let mut st = DetectorState::new();

    let outcome = runner(&feed, &sink, Duration::from_secs(1))
        .run_pass(&mut st)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        PassOutcome::MonitoringStarted {
            marker: OrderId::from("o3"),
            notice_sent: true,
        }
    );
    assert_eq!(sink.texts(), vec![MONITORING_STARTED_TEXT.to_string()]);
    assert!(sink.announced_ids().is_empty());
    assert_eq!(st.last_seen(), Some(&OrderId::from("o3")));
}

// ---------------------------------------------------------------------------
// 2. Ordered announcement + commit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn three_new_orders_are_announced_oldest_first() {
    let feed = Arc::new(ScriptedFeed::always(page(&["n3", "n2", "n1", "old"])));
    let sink = Arc::new(RecordingSink::new());
    let mut st = marker("old");

    let outcome = runner(&feed, &sink, Duration::from_secs(1))
        .run_pass(&mut st)
        .await
        .unwrap();

    assert_eq!(sink.announced_ids(), vec!["n1", "n2", "n3"]);
    assert_eq!(outcome.announced(), 3);
    assert_eq!(outcome.marker(), Some(&OrderId::from("n3")));
    assert_eq!(st.last_seen(), Some(&OrderId::from("n3")));
}

#[tokio::test]
async fn second_pass_on_same_page_announces_nothing() {
    let feed = Arc::new(ScriptedFeed::always(page(&["n2", "n1", "old"])));
    let sink = Arc::new(RecordingSink::new());
    let r = runner(&feed, &sink, Duration::from_secs(1));
    let mut st = marker("old");

    r.run_pass(&mut st).await.unwrap();
    let again = r.run_pass(&mut st).await.unwrap();

    assert_eq!(
        again,
        PassOutcome::NoChange {
            marker: OrderId::from("n2")
        }
    );
    assert_eq!(sink.announced_ids(), vec!["n1", "n2"]);
}

// ---------------------------------------------------------------------------
// 3. Send failure does not roll back the marker
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_send_still_commits_marker() {
    let feed = Arc::new(ScriptedFeed::always(page(&["n3", "n2", "n1", "old"])));
    let sink = Arc::new(RecordingSink::new());
    sink.fail_order("n2");
    let r = runner(&feed, &sink, Duration::from_secs(1));
    let mut st = marker("old");

    let outcome = r.run_pass(&mut st).await.unwrap();

    match &outcome {
        PassOutcome::Announced { report, .. } => {
            assert_eq!(report.attempted, 3);
            assert_eq!(report.sent, 2);
            assert_eq!(report.failed, vec![OrderId::from("n2")]);
        }
        other => panic!("expected Announced, got {other:?}"),
    }
    assert_eq!(sink.announced_ids(), vec!["n1", "n3"]);
    assert_eq!(st.last_seen(), Some(&OrderId::from("n3")));

    // Next pass: nothing is re-announced.
    let next = r.run_pass(&mut st).await.unwrap();
    assert_eq!(next.announced(), 0);
    assert_eq!(sink.attempts(), 3);
}

// ---------------------------------------------------------------------------
// 4. Notice failure still commits baseline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_notice_still_commits_baseline() {
    let feed = Arc::new(ScriptedFeed::always(page(&["b", "a"])));
    let sink = Arc::new(RecordingSink::new());
    sink.fail_text();
    let mut st = DetectorState::new();

    let outcome = runner(&feed, &sink, Duration::from_secs(1))
        .run_pass(&mut st)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        PassOutcome::MonitoringStarted {
            marker: OrderId::from("b"),
            notice_sent: false,
        }
    );
    assert_eq!(st.last_seen(), Some(&OrderId::from("b")));
}

// ---------------------------------------------------------------------------
// 5. Fetch failures leave state untouched
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_failures_are_classified_and_leave_state_unchanged() {
    let cases = [
        (FeedError::Unauthorized, PassError::Auth),
        (
            FeedError::Unavailable { status: 500 },
            PassError::Upstream { status: 500 },
        ),
        (
            FeedError::Transport("reset".to_string()),
            PassError::Transport("reset".to_string()),
        ),
    ];

    for (feed_err, pass_err) in cases {
        let feed = Arc::new(ScriptedFeed::new());
        feed.push(Err(feed_err));
        let sink = Arc::new(RecordingSink::new());
        let mut st = marker("m");
        let before = st.clone();

        let err = runner(&feed, &sink, Duration::from_secs(1))
            .run_pass(&mut st)
            .await
            .unwrap_err();

        assert_eq!(err, pass_err);
        assert_eq!(err.is_fatal(), matches!(err, PassError::Auth));
        assert_eq!(st, before, "failed pass must not touch the marker");
        assert_eq!(sink.attempts(), 0, "failed pass must not notify");
    }
}

#[tokio::test]
async fn failure_before_baseline_keeps_state_unset() {
    let feed = Arc::new(ScriptedFeed::new());
    feed.push(Err(FeedError::Unavailable { status: 502 }));
    let sink = Arc::new(RecordingSink::new());
    let mut st = DetectorState::new();

    assert!(runner(&feed, &sink, Duration::from_secs(1))
        .run_pass(&mut st)
        .await
        .is_err());
    assert!(!st.has_baseline());
}

// ---------------------------------------------------------------------------
// 6. Timeout
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stalled_fetch_times_out() {
    let feed = Arc::new(ScriptedFeed::always(page(&["x"])));
    feed.set_delay(Duration::from_millis(500));
    let sink = Arc::new(RecordingSink::new());
    let mut st = marker("m");

    let err = runner(&feed, &sink, Duration::from_millis(20))
        .run_pass(&mut st)
        .await
        .unwrap_err();

    assert!(matches!(err, PassError::Transport(_)), "got {err:?}");
    assert!(!err.is_fatal());
    assert_eq!(st.last_seen(), Some(&OrderId::from("m")));
}

// ---------------------------------------------------------------------------
// 7. Page size
// ---------------------------------------------------------------------------

#[tokio::test]
async fn runner_requests_configured_page_size() {
    let feed = Arc::new(ScriptedFeed::always(page(&["x"])));
    let sink = Arc::new(RecordingSink::new());
    let r = PassRunner::new(
        feed.clone(),
        Notifier::new(sink.clone(), Duration::from_secs(1)),
        25,
        Duration::from_secs(1),
    );

    r.run_pass(&mut DetectorState::new()).await.unwrap();
    assert_eq!(feed.calls(), vec![25]);
}
