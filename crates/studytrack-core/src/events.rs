use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{PhaseTag, TimerMode, TimerState};

/// Every state change in the timer and session flow produces an Event.
/// The controller broadcasts them; the CLI renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        tag: Option<PhaseTag>,
        display_secs: u64,
        at: DateTime<Utc>,
    },
    TimerTick {
        mode: TimerMode,
        display_secs: u64,
        display: String,
    },
    /// Manual stop. Elapsed time comes from these two stamps only.
    TimerStopped {
        started_at: DateTime<Utc>,
        stop_at: DateTime<Utc>,
    },
    /// Countdown reached zero and stopped itself.
    TimerCompleted {
        tag: Option<PhaseTag>,
        started_at: DateTime<Utc>,
        stop_at: DateTime<Utc>,
    },
    ModeChanged {
        mode: TimerMode,
        display_secs: u64,
    },
    DurationConfigured {
        configured_duration_secs: u64,
    },
    DistractionRecorded {
        count: u32,
    },
    /// Stop was accepted by the timer but no session will be created.
    SessionRejected {
        reason: String,
    },
    /// A stopped session is waiting for the productivity percentage.
    SessionPending {
        label_text: String,
        elapsed_secs: u64,
    },
    SessionRecorded {
        session_id: String,
        label_text: String,
        elapsed_secs: u64,
        efficiency_score: i64,
    },
    StateSnapshot {
        state: TimerState,
        display: String,
        at: DateTime<Utc>,
    },
}
