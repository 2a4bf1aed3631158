//! Shared runtime state for sw-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum. The detector state sits
//! behind a `tokio::sync::Mutex` that is held for the full duration of a
//! pass, which is what serializes scheduled ticks and manual triggers.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sw_detect::DetectorState;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::pass::{PassError, PassOutcome, PassRunner, PassTrigger};

// ---------------------------------------------------------------------------
// BusMsg: SSE event bus payload
// ---------------------------------------------------------------------------

/// Messages broadcast over the internal event bus and surfaced as SSE events.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusMsg {
    Heartbeat { ts_millis: i64 },
    Status(StatusSnapshot),
    LogLine { level: String, msg: String },
    PassCompleted {
        trigger: PassTrigger,
        outcome: PassOutcome,
    },
}

// ---------------------------------------------------------------------------
// BuildInfo
// ---------------------------------------------------------------------------

/// Static build metadata included in health / status responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// StatusSnapshot
// ---------------------------------------------------------------------------

pub const STATE_IDLE: &str = "idle";
pub const STATE_RUNNING: &str = "running";
pub const STATE_HALTED: &str = "halted";

/// Point-in-time snapshot of daemon state, returned by GET /v1/status and
/// carried inside SSE `status` events.
#[derive(Clone, Debug, Serialize)]
pub struct StatusSnapshot {
    pub daemon_uptime_secs: u64,
    /// "idle" | "running" | "halted"
    pub state: String,
    /// Marker after the last committed pass.
    pub last_seen_id: Option<String>,
    pub last_pass_at_ms: Option<i64>,
    pub last_outcome: Option<PassOutcome>,
    pub last_error: Option<String>,
    pub passes_completed: u64,
    pub passes_failed: u64,
    pub ticks_skipped: u64,
    pub orders_announced: u64,
}

impl StatusSnapshot {
    fn boot() -> Self {
        Self {
            daemon_uptime_secs: uptime_secs(),
            state: STATE_IDLE.to_string(),
            last_seen_id: None,
            last_pass_at_ms: None,
            last_outcome: None,
            last_error: None,
            passes_completed: 0,
            passes_failed: 0,
            ticks_skipped: 0,
            orders_announced: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Cloneable (Arc) handle shared across all Axum handlers and the poll task.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast bus for SSE.
    pub bus: broadcast::Sender<BusMsg>,
    /// Static build metadata.
    pub build: BuildInfo,
    /// Observable status (never the source of truth for the marker).
    pub status: Arc<RwLock<StatusSnapshot>>,
    /// The one and only marker state. Lock is held for a whole pass.
    pub detector: Arc<Mutex<DetectorState>>,
    pub runner: Arc<PassRunner>,
}

impl AppState {
    pub fn new(runner: PassRunner) -> Self {
        Self::with_detector(runner, DetectorState::new())
    }

    pub fn with_detector(runner: PassRunner, detector: DetectorState) -> Self {
        let (bus, _rx) = broadcast::channel::<BusMsg>(1024);

        let mut boot = StatusSnapshot::boot();
        boot.last_seen_id = detector.last_seen().map(|id| id.to_string());

        Self {
            bus,
            build: BuildInfo {
                service: "shopwatch",
                version: env!("CARGO_PKG_VERSION"),
            },
            status: Arc::new(RwLock::new(boot)),
            detector: Arc::new(Mutex::new(detector)),
            runner: Arc::new(runner),
        }
    }

    pub async fn is_halted(&self) -> bool {
        self.status.read().await.state == STATE_HALTED
    }

    fn log_line(&self, level: &str, msg: String) {
        let _ = self.bus.send(BusMsg::LogLine {
            level: level.to_string(),
            msg,
        });
    }

    async fn record_skip(&self) {
        let mut s = self.status.write().await;
        s.ticks_skipped += 1;
    }
}

// ---------------------------------------------------------------------------
// Pass execution
// ---------------------------------------------------------------------------

/// Run one pass with the detector lock already held, and publish the result.
///
/// `detector` must come from a held `state.detector` guard. Scheduled ticks
/// and manual triggers both come through here.
pub async fn execute_pass(
    state: &AppState,
    detector: &mut DetectorState,
    trigger: PassTrigger,
) -> Result<PassOutcome, PassError> {
    {
        let mut s = state.status.write().await;
        s.state = STATE_RUNNING.to_string();
    }

    let result = state.runner.run_pass(detector).await;

    let snap = {
        let mut s = state.status.write().await;
        s.daemon_uptime_secs = uptime_secs();
        s.last_pass_at_ms = Some(chrono::Utc::now().timestamp_millis());
        s.last_seen_id = detector.last_seen().map(|id| id.to_string());

        match &result {
            Ok(outcome) => {
                s.state = STATE_IDLE.to_string();
                s.passes_completed += 1;
                s.orders_announced += outcome.announced() as u64;
                s.last_outcome = Some(outcome.clone());
                s.last_error = None;
            }
            Err(e) => {
                s.passes_failed += 1;
                s.last_error = Some(e.to_string());
                s.state = if e.is_fatal() {
                    STATE_HALTED.to_string()
                } else {
                    STATE_IDLE.to_string()
                };
            }
        }
        s.clone()
    };

    match &result {
        Ok(outcome) => {
            debug!(?trigger, ?outcome, "pass completed");
            let _ = state.bus.send(BusMsg::PassCompleted {
                trigger,
                outcome: outcome.clone(),
            });
        }
        Err(e) if e.is_fatal() => {
            error!(?trigger, error = %e, "fatal pass error; polling halted until restart");
            state.log_line("ERROR", format!("{e}; polling halted until restart"));
        }
        Err(e) => {
            warn!(?trigger, error = %e, "pass failed; state unchanged, retrying next tick");
            state.log_line("WARN", e.to_string());
        }
    }
    let _ = state.bus.send(BusMsg::Status(snap));

    result
}

/// Why a manual check did not produce an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualCheckError {
    /// Polling was halted by a fatal error; restart required.
    Halted,
    Pass(PassError),
}

/// Operator-triggered pass.
///
/// Acknowledges in the channel, then waits for any in-flight pass to finish
/// before running its own through the same path as the scheduler.
pub async fn run_manual_check(state: &AppState) -> Result<PassOutcome, ManualCheckError> {
    if state.is_halted().await {
        return Err(ManualCheckError::Halted);
    }

    if let Err(e) = state.runner.notifier().acknowledge_manual_check().await {
        warn!(error = %e, "manual check acknowledgement failed");
    }

    let mut detector = state.detector.lock().await;
    // A fatal error may have landed while this request was queued.
    if state.is_halted().await {
        return Err(ManualCheckError::Halted);
    }

    info!("manual check");
    execute_pass(state, &mut detector, PassTrigger::Manual)
        .await
        .map_err(ManualCheckError::Pass)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Monotonically increasing uptime since first call (process lifetime).
pub fn uptime_secs() -> u64 {
    static START: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
    START
        .get_or_init(std::time::Instant::now)
        .elapsed()
        .as_secs()
}

/// Spawn a background task that emits a heartbeat SSE every `interval`.
pub fn spawn_heartbeat(bus: broadcast::Sender<BusMsg>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let ts = chrono::Utc::now().timestamp_millis();
            let _ = bus.send(BusMsg::Heartbeat { ts_millis: ts });
        }
    });
}

/// Spawn the polling loop.
///
/// On each interval (the first fires immediately):
/// - If the daemon is halted, the task exits.
/// - If a pass is already in flight (detector lock held), the tick is
///   skipped, not queued. Late ticks are dropped rather than bunched.
/// - Otherwise a scheduled pass runs through [`execute_pass`].
/// - A fatal pass error ends the task; recoverable errors wait for the next tick.
pub fn spawn_poll_tick(state: Arc<AppState>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;

            if state.is_halted().await {
                warn!("polling halted; poll task exiting");
                return;
            }

            let Ok(mut detector) = state.detector.try_lock() else {
                debug!("pass already in flight; tick skipped");
                state.record_skip().await;
                continue;
            };

            let result = execute_pass(&state, &mut detector, PassTrigger::Scheduled).await;
            drop(detector);

            if matches!(&result, Err(e) if e.is_fatal()) {
                return;
            }
        }
    })
}
