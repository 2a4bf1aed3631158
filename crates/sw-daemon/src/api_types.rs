//! Request and response types for all sw-daemon HTTP endpoints.
//!
//! No business logic lives here.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// /v1/health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// /v1/check refusals and failures
// ---------------------------------------------------------------------------

/// Body returned when a manual check is refused (409) or the pass it ran
/// failed (502).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckFailedResponse {
    pub error: String,
    /// true = polling is halted until restart.
    pub fatal: bool,
}
