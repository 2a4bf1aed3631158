//! Detector marker state.
//!
//! # Invariants
//!
//! - **Single writer**: the scheduling loop owns the state and serializes
//!   passes; nothing else holds a mutable reference.
//! - **Commit-only mutation**: the marker changes only through
//!   [`DetectorState::commit`], after the pass's announcements were issued.
//! - **No durability**: the state lives for the process lifetime; a restart
//!   begins with an unset marker and a fresh baseline.

use serde::{Deserialize, Serialize};
use sw_schemas::OrderId;

use crate::Reconciliation;

/// Identifier of the most recently announced order, or unset before the
/// first successful fetch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorState {
    last_seen: Option<OrderId>,
}

impl DetectorState {
    /// Fresh state: no marker, the next non-empty page establishes a baseline.
    pub fn new() -> Self {
        Self { last_seen: None }
    }

    /// State resuming from a known marker.
    pub fn with_marker(last_seen: OrderId) -> Self {
        Self {
            last_seen: Some(last_seen),
        }
    }

    pub fn last_seen(&self) -> Option<&OrderId> {
        self.last_seen.as_ref()
    }

    /// `true` once a baseline has been recorded.
    pub fn has_baseline(&self) -> bool {
        self.last_seen.is_some()
    }

    /// Apply the marker computed by [`crate::reconcile`].
    ///
    /// Returns `true` if the marker moved.
    pub fn commit(&mut self, rec: &Reconciliation) -> bool {
        if rec.updated_last_seen == self.last_seen {
            return false;
        }
        self.last_seen = rec.updated_last_seen.clone();
        true
    }
}
