//! Scenario: batch dispatch preserves order and tolerates failed sends.
//!
//! # Invariants under test
//!
//! 1. Orders are announced in exactly the order given (oldest first).
//! 2. A failed send is recorded and the rest of the batch is still attempted.
//! 3. Every order is attempted exactly once.
//! 4. A send that overruns the call timeout is a failure, not a hang.
//! 5. The monitoring-started and manual-check texts go out as plain text.

use std::sync::Arc;
use std::time::Duration;

use sw_notify::{Notifier, NotifyError, MANUAL_CHECK_TEXT, MONITORING_STARTED_TEXT};
use sw_schemas::OrderId;
use sw_testkit::{order, RecordingSink};

fn notifier(sink: &Arc<RecordingSink>) -> Notifier {
    Notifier::new(sink.clone(), Duration::from_secs(1))
}

// ---------------------------------------------------------------------------
// 1. Order preserved
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dispatch_announces_in_given_order() {
    let sink = Arc::new(RecordingSink::new());
    let batch = vec![order("A", 1), order("B", 2), order("C", 3)];

    let report = notifier(&sink).dispatch(&batch).await;

    assert_eq!(sink.announced_ids(), vec!["A", "B", "C"]);
    assert_eq!(report.attempted, 3);
    assert_eq!(report.sent, 3);
    assert!(report.all_sent());
}

// ---------------------------------------------------------------------------
// 2 + 3. Partial failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_send_does_not_stop_the_batch() {
    let sink = Arc::new(RecordingSink::new());
    sink.fail_order("B");
    let batch = vec![order("A", 1), order("B", 2), order("C", 3)];

    let report = notifier(&sink).dispatch(&batch).await;

    assert_eq!(sink.announced_ids(), vec!["A", "C"]);
    assert_eq!(sink.attempts(), 3, "each order attempted exactly once");
    assert_eq!(report.attempted, 3);
    assert_eq!(report.sent, 2);
    assert_eq!(report.failed, vec![OrderId::from("B")]);
    assert!(!report.all_sent());
}

#[tokio::test]
async fn empty_batch_sends_nothing() {
    let sink = Arc::new(RecordingSink::new());
    let report = notifier(&sink).dispatch(&[]).await;

    assert_eq!(sink.attempts(), 0);
    assert_eq!(report.attempted, 0);
}

// ---------------------------------------------------------------------------
// 4. Timeout
// ---------------------------------------------------------------------------

#[tokio::test]
async fn slow_send_times_out_as_transport() {
    let sink = Arc::new(RecordingSink::new());
    sink.set_delay(Duration::from_millis(500));
    let n = Notifier::new(sink.clone(), Duration::from_millis(20));

    let err = n.announce(&order("A", 1)).await.unwrap_err();
    assert!(matches!(err, NotifyError::Transport(_)), "got {err:?}");
    assert!(sink.announced_ids().is_empty());
}

// ---------------------------------------------------------------------------
// 5. Plain text messages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_texts_are_plain_messages() {
    let sink = Arc::new(RecordingSink::new());
    let n = notifier(&sink);

    n.announce_monitoring_started().await.unwrap();
    n.acknowledge_manual_check().await.unwrap();

    assert_eq!(
        sink.texts(),
        vec![MONITORING_STARTED_TEXT.to_string(), MANUAL_CHECK_TEXT.to_string()]
    );
    assert!(sink.announced_ids().is_empty());
}
