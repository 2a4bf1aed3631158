use serde::Serialize;
use sw_schemas::{FeedPage, Order, OrderId};

use crate::DetectorState;

/// What kind of pass this was, for logging and for the notifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PassSignal {
    /// The feed returned no orders. Marker untouched.
    EmptyFeed,
    /// No marker existed; this page's newest order is now the baseline.
    /// Nothing is announced.
    MonitoringStarted,
    /// The newest order is the marker. Nothing new.
    NoChange,
    /// At least one order is new.
    ///
    /// `marker_found == false` means the marker was not on the page (more
    /// than a page of orders arrived, or the marker aged out). The whole page
    /// is treated as new and anything older than the page is missed.
    NewOrders { marker_found: bool },
}

/// Result of reconciling one page against the marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciliation {
    /// New orders, oldest first.
    pub new_orders: Vec<Order>,
    /// Marker to commit once announcements for this pass were issued.
    pub updated_last_seen: Option<OrderId>,
    pub signal: PassSignal,
}

impl Reconciliation {
    fn unchanged(state: &DetectorState, signal: PassSignal) -> Self {
        Self {
            new_orders: Vec::new(),
            updated_last_seen: state.last_seen().cloned(),
            signal,
        }
    }

    pub fn is_baseline(&self) -> bool {
        self.signal == PassSignal::MonitoringStarted
    }
}

/// Compute the genuinely new orders on `page` relative to `state`.
///
/// - Empty page => nothing new, marker unchanged
/// - No marker yet => baseline at the newest order, nothing announced
/// - Newest order is the marker => nothing new
/// - Otherwise => every order above the marker (or the whole page if the
///   marker is absent), reversed to chronological order
///
/// Does not mutate `state`; call [`DetectorState::commit`] afterwards.
pub fn reconcile(page: &FeedPage, state: &DetectorState) -> Reconciliation {
    let Some(newest) = page.newest() else {
        return Reconciliation::unchanged(state, PassSignal::EmptyFeed);
    };

    let Some(last_seen) = state.last_seen() else {
        return Reconciliation {
            new_orders: Vec::new(),
            updated_last_seen: Some(newest.id.clone()),
            signal: PassSignal::MonitoringStarted,
        };
    };

    let orders = page.orders();
    let marker_pos = orders.iter().position(|o| &o.id == last_seen);
    let fresh = &orders[..marker_pos.unwrap_or(orders.len())];

    if fresh.is_empty() {
        return Reconciliation::unchanged(state, PassSignal::NoChange);
    }

    Reconciliation {
        new_orders: fresh.iter().rev().cloned().collect(),
        updated_last_seen: Some(newest.id.clone()),
        signal: PassSignal::NewOrders {
            marker_found: marker_pos.is_some(),
        },
    }
}
