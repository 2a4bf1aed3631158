use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use sw_schemas::{Order, OrderId};
use tracing::{info, warn};

use crate::{
    render_order_embed, ChannelSink, NotifyError, MANUAL_CHECK_TEXT, MONITORING_STARTED_TEXT,
};

/// Outcome of announcing one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub attempted: usize,
    pub sent: usize,
    /// Orders whose send failed, in attempt order.
    pub failed: Vec<OrderId>,
}

impl DispatchReport {
    pub fn all_sent(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Renders notifications and pushes them through a [`ChannelSink`].
///
/// Every send is bounded by `call_timeout`; a send that overruns it is
/// reported as [`NotifyError::Transport`].
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn ChannelSink>,
    call_timeout: Duration,
}

impl Notifier {
    pub fn new(sink: Arc<dyn ChannelSink>, call_timeout: Duration) -> Self {
        Self { sink, call_timeout }
    }

    async fn bounded<F>(&self, send: F) -> Result<(), NotifyError>
    where
        F: Future<Output = Result<(), NotifyError>>,
    {
        match tokio::time::timeout(self.call_timeout, send).await {
            Ok(res) => res,
            Err(_) => Err(NotifyError::Transport(format!(
                "send timed out after {}ms",
                self.call_timeout.as_millis()
            ))),
        }
    }

    pub async fn announce(&self, order: &Order) -> Result<(), NotifyError> {
        let embed = render_order_embed(order);
        self.bounded(self.sink.send_embed(&embed)).await
    }

    pub async fn announce_monitoring_started(&self) -> Result<(), NotifyError> {
        self.bounded(self.sink.send_text(MONITORING_STARTED_TEXT)).await
    }

    /// Reply to an operator-issued manual check before the pass runs.
    pub async fn acknowledge_manual_check(&self) -> Result<(), NotifyError> {
        self.bounded(self.sink.send_text(MANUAL_CHECK_TEXT)).await
    }

    /// Announce `orders` in the given order (callers pass oldest first).
    ///
    /// A failed send is logged and skipped; the remaining orders are still
    /// attempted. Every order is attempted exactly once.
    pub async fn dispatch(&self, orders: &[Order]) -> DispatchReport {
        let mut report = DispatchReport::default();

        for order in orders {
            report.attempted += 1;
            match self.announce(order).await {
                Ok(()) => {
                    report.sent += 1;
                    info!(order_id = %order.id, "order announced");
                }
                Err(e) => {
                    warn!(
                        order_id = %order.id,
                        error = %e,
                        "order announcement failed; continuing"
                    );
                    report.failed.push(order.id.clone());
                }
            }
        }

        report
    }
}
