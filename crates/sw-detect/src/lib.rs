//! sw-detect
//!
//! New-order detection against a last-seen marker.
//!
//! Architectural decisions:
//! - The feed's newest-first position is the only ordering oracle
//! - First successful pass records a baseline and announces nothing
//! - A marker missing from the page means the whole page is new
//! - The marker advances only when something new was found
//!
//! Deterministic, pure logic. No IO. No clocks.

mod engine;
mod state;

pub use engine::{reconcile, PassSignal, Reconciliation};
pub use state::DetectorState;
