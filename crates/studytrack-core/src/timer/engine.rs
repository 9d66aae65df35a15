//! Timer engine implementation.
//!
//! The engine is a two-state machine driven from outside. It owns no
//! thread and no interval: the caller supplies wall-clock stamps for
//! `start`/`stop` and calls `tick()` once per second while running
//! (see [`super::Ticker`]).
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Running --stop--> Idle
//!                 Running --tick (countdown hits 0)--> Idle
//! ```
//!
//! The displayed counter is for presentation only. Elapsed session time is
//! always `stop_at - started_at`, so late or dropped ticks never skew it.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new();
//! engine.start(Utc::now())?;
//! // once per second:
//! if let Some(Event::TimerCompleted { .. }) = engine.tick(Utc::now())? { ... }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::mode::{PhaseTag, TimerMode};
use crate::error::TimerError;
use crate::events::Event;
use crate::format::format_clock;

pub const DEFAULT_CONFIGURED_SECS: u64 = 25 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
}

/// Consolidated timer state. Only the engine's transition methods mutate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub mode: TimerMode,
    pub is_running: bool,
    /// Elapsed seconds (stopwatch) or remaining seconds (countdown).
    pub remaining_or_elapsed_secs: u64,
    /// Only meaningful for countdown.
    pub configured_duration_secs: u64,
    pub started_at: Option<DateTime<Utc>>,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            mode: TimerMode::Stopwatch,
            is_running: false,
            remaining_or_elapsed_secs: 0,
            configured_duration_secs: DEFAULT_CONFIGURED_SECS,
            started_at: None,
        }
    }
}

impl TimerState {
    pub fn status(&self) -> TimerStatus {
        if self.is_running {
            TimerStatus::Running
        } else {
            TimerStatus::Idle
        }
    }
}

/// Single-timer state machine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimerEngine {
    state: TimerState,
    #[serde(default)]
    tag: Option<PhaseTag>,
}

impl TimerEngine {
    /// Idle stopwatch at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Idle countdown showing `duration_secs`.
    pub fn countdown(duration_secs: u64, tag: Option<PhaseTag>) -> Result<Self, TimerError> {
        if duration_secs == 0 {
            return Err(TimerError::InvalidDuration);
        }
        Ok(Self {
            state: TimerState {
                mode: TimerMode::Countdown,
                is_running: false,
                remaining_or_elapsed_secs: duration_secs,
                configured_duration_secs: duration_secs,
                started_at: None,
            },
            tag,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn status(&self) -> TimerStatus {
        self.state.status()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn mode(&self) -> TimerMode {
        self.state.mode
    }

    pub fn tag(&self) -> Option<PhaseTag> {
        self.tag
    }

    pub fn remaining_or_elapsed_secs(&self) -> u64 {
        self.state.remaining_or_elapsed_secs
    }

    pub fn configured_duration_secs(&self) -> u64 {
        self.state.configured_duration_secs
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.state.started_at
    }

    /// Display text: countdowns drop the hour field under an hour.
    pub fn display(&self) -> String {
        let omit_hours = self.state.mode == TimerMode::Countdown;
        format_clock(self.state.remaining_or_elapsed_secs, omit_hours)
    }

    pub fn snapshot(&self, at: DateTime<Utc>) -> Event {
        Event::StateSnapshot {
            state: self.state.clone(),
            display: self.display(),
            at,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, at: DateTime<Utc>) -> Result<Event, TimerError> {
        self.require(TimerStatus::Idle, "start")?;
        self.reset_display();
        self.state.is_running = true;
        self.state.started_at = Some(at);
        Ok(Event::TimerStarted {
            mode: self.state.mode,
            tag: self.tag,
            display_secs: self.state.remaining_or_elapsed_secs,
            at,
        })
    }

    /// Advance the display by one second.
    ///
    /// Returns `Some(Event::TimerCompleted)` exactly once, on the tick that
    /// brings a countdown to zero; the engine is then idle and further ticks
    /// are rejected.
    pub fn tick(&mut self, at: DateTime<Utc>) -> Result<Option<Event>, TimerError> {
        self.require(TimerStatus::Running, "tick")?;
        match self.state.mode {
            TimerMode::Stopwatch => {
                self.state.remaining_or_elapsed_secs =
                    self.state.remaining_or_elapsed_secs.saturating_add(1);
                Ok(None)
            }
            TimerMode::Countdown => {
                self.state.remaining_or_elapsed_secs =
                    self.state.remaining_or_elapsed_secs.saturating_sub(1);
                if self.state.remaining_or_elapsed_secs > 0 {
                    return Ok(None);
                }
                let started_at = self.finish();
                Ok(Some(Event::TimerCompleted {
                    tag: self.tag,
                    started_at,
                    stop_at: at,
                }))
            }
        }
    }

    pub fn stop(&mut self, at: DateTime<Utc>) -> Result<Event, TimerError> {
        self.require(TimerStatus::Running, "stop")?;
        let started_at = self.finish();
        Ok(Event::TimerStopped {
            started_at,
            stop_at: at,
        })
    }

    pub fn set_mode(&mut self, mode: TimerMode) -> Result<Event, TimerError> {
        self.require(TimerStatus::Idle, "change mode")?;
        self.state.mode = mode;
        self.reset_display();
        Ok(Event::ModeChanged {
            mode,
            display_secs: self.state.remaining_or_elapsed_secs,
        })
    }

    pub fn set_configured_duration(&mut self, secs: u64) -> Result<Event, TimerError> {
        self.require(TimerStatus::Idle, "configure duration")?;
        if secs == 0 {
            return Err(TimerError::InvalidDuration);
        }
        self.state.configured_duration_secs = secs;
        if self.state.mode == TimerMode::Countdown {
            self.state.remaining_or_elapsed_secs = secs;
        }
        Ok(Event::DurationConfigured {
            configured_duration_secs: secs,
        })
    }

    /// Duration input as entered by the user, in whole minutes.
    pub fn set_configured_minutes(&mut self, minutes: u64) -> Result<Event, TimerError> {
        let secs = minutes.checked_mul(60).ok_or(TimerError::InvalidDuration)?;
        self.set_configured_duration(secs)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn require(&self, expected: TimerStatus, action: &'static str) -> Result<(), TimerError> {
        let state = self.status();
        if state == expected {
            Ok(())
        } else {
            Err(TimerError::IllegalTransition { action, state })
        }
    }

    fn reset_display(&mut self) {
        self.state.remaining_or_elapsed_secs = match self.state.mode {
            TimerMode::Stopwatch => 0,
            TimerMode::Countdown => self.state.configured_duration_secs,
        };
    }

    /// Running -> Idle. Returns the start stamp.
    fn finish(&mut self) -> DateTime<Utc> {
        self.state.is_running = false;
        // `started_at` is always set while running.
        self.state.started_at.take().unwrap_or_default()
    }
}
