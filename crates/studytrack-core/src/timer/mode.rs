use serde::{Deserialize, Serialize};

use super::engine::TimerEngine;
use crate::error::TimerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    /// Count up from zero until stopped.
    #[default]
    Stopwatch,
    /// Count down from the configured duration; stops itself at zero.
    Countdown,
}

/// Which half of a pomodoro pair a countdown belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseTag {
    Work,
    Break,
}

/// A pomodoro is two countdowns configured independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PomodoroPair {
    pub work: TimerEngine,
    pub rest: TimerEngine,
}

impl PomodoroPair {
    /// Both durations must be positive.
    pub fn new(work_secs: u64, break_secs: u64) -> Result<Self, TimerError> {
        Ok(Self {
            work: TimerEngine::countdown(work_secs, Some(PhaseTag::Work))?,
            rest: TimerEngine::countdown(break_secs, Some(PhaseTag::Break))?,
        })
    }

    /// Durations as entered by the user, in whole minutes.
    pub fn from_minutes(work_minutes: u64, break_minutes: u64) -> Result<Self, TimerError> {
        let to_secs = |minutes: u64| minutes.checked_mul(60).ok_or(TimerError::InvalidDuration);
        Self::new(to_secs(work_minutes)?, to_secs(break_minutes)?)
    }

    pub fn phase(&self, tag: PhaseTag) -> &TimerEngine {
        match tag {
            PhaseTag::Work => &self.work,
            PhaseTag::Break => &self.rest,
        }
    }

    pub fn phase_mut(&mut self, tag: PhaseTag) -> &mut TimerEngine {
        match tag {
            PhaseTag::Work => &mut self.work,
            PhaseTag::Break => &mut self.rest,
        }
    }
}
