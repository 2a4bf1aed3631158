//! One reconciliation pass: fetch -> detect -> notify -> commit.
//!
//! # Invariants
//!
//! - The marker is committed only after every announcement for the pass was
//!   attempted. A crash mid-batch replays the batch on the next pass
//!   (possible duplicate, never a silent loss).
//! - A failed fetch returns before `reconcile` runs, so the state is left
//!   exactly as it was. A failed tick is a no-op pass.
//! - A failed send is logged and counted; it never rolls back the marker.
//! - Every outbound call is bounded by the runner's call timeout.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sw_detect::{reconcile, DetectorState, PassSignal};
use sw_feed::{FeedError, OrderFeed};
use sw_notify::{DispatchReport, Notifier};
use sw_schemas::{FeedPage, OrderId};
use tracing::{info, warn};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Trigger
// ---------------------------------------------------------------------------

/// What started a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassTrigger {
    Scheduled,
    Manual,
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of a pass that reached the detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PassOutcome {
    /// Feed was empty; nothing changed.
    EmptyFeed { marker: Option<OrderId> },
    /// First pass: marker recorded, "monitoring started" sent.
    MonitoringStarted {
        marker: OrderId,
        notice_sent: bool,
    },
    /// Newest order is already the marker.
    NoChange { marker: OrderId },
    /// New orders were announced (oldest first).
    Announced {
        marker: OrderId,
        /// `false` when the previous marker had fallen off the page.
        marker_found: bool,
        report: DispatchReport,
    },
}

impl PassOutcome {
    pub fn marker(&self) -> Option<&OrderId> {
        match self {
            PassOutcome::EmptyFeed { marker } => marker.as_ref(),
            PassOutcome::MonitoringStarted { marker, .. }
            | PassOutcome::NoChange { marker }
            | PassOutcome::Announced { marker, .. } => Some(marker),
        }
    }

    /// Orders successfully announced in this pass.
    pub fn announced(&self) -> usize {
        match self {
            PassOutcome::Announced { report, .. } => report.sent,
            _ => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Tick-level failure. The detector state is untouched whenever this is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassError {
    /// Marketplace rejected the credentials. Fatal: polling stops until the
    /// process is restarted with a working key.
    Auth,
    /// Non-2xx from the marketplace. Retried on the next tick.
    Upstream { status: u16 },
    /// Network failure, timeout or undecodable payload. Retried on the next tick.
    Transport(String),
}

impl PassError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, PassError::Auth)
    }
}

impl From<FeedError> for PassError {
    fn from(e: FeedError) -> Self {
        match e {
            FeedError::Unauthorized => PassError::Auth,
            FeedError::Unavailable { status } => PassError::Upstream { status },
            FeedError::Transport(msg) => PassError::Transport(msg),
        }
    }
}

impl fmt::Display for PassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassError::Auth => write!(f, "AUTH_ERROR: marketplace rejected credentials"),
            PassError::Upstream { status } => {
                write!(f, "UPSTREAM_UNAVAILABLE: marketplace status={status}")
            }
            PassError::Transport(msg) => write!(f, "TRANSPORT_ERROR: {msg}"),
        }
    }
}

impl std::error::Error for PassError {}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Owns the outbound collaborators for a pass. Holds no detector state; the
/// caller passes it in and is responsible for serializing calls.
#[derive(Clone)]
pub struct PassRunner {
    feed: Arc<dyn OrderFeed>,
    notifier: Notifier,
    page_size: u32,
    call_timeout: Duration,
}

impl PassRunner {
    pub fn new(
        feed: Arc<dyn OrderFeed>,
        notifier: Notifier,
        page_size: u32,
        call_timeout: Duration,
    ) -> Self {
        Self {
            feed,
            notifier,
            page_size,
            call_timeout,
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    async fn fetch(&self) -> Result<FeedPage, PassError> {
        let call = self.feed.fetch_recent_orders(self.page_size);
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(res) => res.map_err(PassError::from),
            Err(_) => Err(PassError::Transport(format!(
                "{} fetch timed out after {}ms",
                self.feed.source_name(),
                self.call_timeout.as_millis()
            ))),
        }
    }

    /// Run one pass against `state`.
    ///
    /// The caller must hold exclusive access to `state` for the whole call.
    pub async fn run_pass(&self, state: &mut DetectorState) -> Result<PassOutcome, PassError> {
        let pass_id = Uuid::new_v4();
        let page = self.fetch().await?;
        let rec = reconcile(&page, state);

        let outcome = match (&rec.signal, rec.updated_last_seen.clone()) {
            (PassSignal::EmptyFeed, marker) | (_, marker @ None) => {
                PassOutcome::EmptyFeed { marker }
            }
            (PassSignal::NoChange, Some(marker)) => PassOutcome::NoChange { marker },
            (PassSignal::MonitoringStarted, Some(marker)) => {
                let notice_sent = match self.notifier.announce_monitoring_started().await {
                    Ok(()) => true,
                    Err(e) => {
                        // Baseline is still recorded; only the notice is lost.
                        warn!(%pass_id, error = %e, "monitoring-started notice failed");
                        false
                    }
                };
                info!(%pass_id, %marker, "baseline recorded; monitoring started");
                PassOutcome::MonitoringStarted {
                    marker,
                    notice_sent,
                }
            }
            (PassSignal::NewOrders { marker_found }, Some(marker)) => {
                let marker_found = *marker_found;
                if !marker_found {
                    warn!(
                        %pass_id,
                        previous = ?state.last_seen().map(OrderId::as_str),
                        page_size = self.page_size,
                        "marker not on page; announcing whole page, older orders may be missed"
                    );
                }
                let report = self.notifier.dispatch(&rec.new_orders).await;
                info!(
                    %pass_id,
                    %marker,
                    sent = report.sent,
                    failed = report.failed.len(),
                    "new orders announced"
                );
                PassOutcome::Announced {
                    marker,
                    marker_found,
                    report,
                }
            }
        };

        state.commit(&rec);
        Ok(outcome)
    }
}
