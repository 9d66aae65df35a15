//! The study flow behind the timer screen.
//!
//! `StudyTracker` accepts the user actions (start, stop, mode and duration
//! changes, distractions, productivity submission) and turns a finished
//! timer run into a [`SessionRecord`]. It is synchronous; the async
//! [`crate::timer::TimerController`] drives it once per second.

use chrono::{DateTime, Utc};

use super::record::{SessionDraft, SessionRecord};
use super::recorder::on_stop;
use crate::error::{CoreError, SessionError, TimerError, ValidationError};
use crate::events::Event;
use crate::productivity::{validate_percent, LabelProductivityMap};
use crate::timer::{TimerEngine, TimerMode, TimerStatus};

#[derive(Debug, Clone, Default)]
pub struct StudyTracker {
    engine: TimerEngine,
    labels: LabelProductivityMap,
    selected_label: Option<String>,
    distraction_count: u32,
    pending: Option<SessionDraft>,
}

impl StudyTracker {
    pub fn new(engine: TimerEngine) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn labels(&self) -> &LabelProductivityMap {
        &self.labels
    }

    pub fn selected_label(&self) -> Option<&str> {
        self.selected_label.as_deref()
    }

    pub fn distraction_count(&self) -> u32 {
        self.distraction_count
    }

    pub fn pending(&self) -> Option<&SessionDraft> {
        self.pending.as_ref()
    }

    // ── Labels ───────────────────────────────────────────────────────

    /// Take a new label snapshot. The selection survives only if its label
    /// is still present.
    pub fn update_labels(&mut self, snapshot: LabelProductivityMap) {
        if let Some(selected) = &self.selected_label {
            if !snapshot.contains(selected) {
                tracing::info!(label = %selected, "selected label no longer exists");
                self.selected_label = None;
            }
        }
        self.labels = snapshot;
    }

    pub fn select_label(&mut self, label_text: &str) -> Result<(), ValidationError> {
        if !self.labels.contains(label_text) {
            return Err(ValidationError::InvalidValue {
                field: "label_text".into(),
                message: format!("unknown label '{label_text}'"),
            });
        }
        self.selected_label = Some(label_text.to_string());
        Ok(())
    }

    // ── Timer actions ────────────────────────────────────────────────

    /// Start a run. Refused while the user has no labels at all; without an
    /// explicit selection the first label (by name) is used.
    pub fn start(&mut self, at: DateTime<Utc>) -> Result<Event, CoreError> {
        let label = match (&self.selected_label, self.labels.labels().first()) {
            (Some(selected), _) => selected.clone(),
            (None, Some(first)) => first.to_string(),
            (None, None) => return Err(SessionError::NoLabelSelected.into()),
        };

        let event = self.engine.start(at)?;
        if let Some(dropped) = self.pending.take() {
            tracing::warn!(
                label = %dropped.label_text,
                elapsed_secs = dropped.elapsed_secs,
                "discarding session that never received productivity input"
            );
        }
        self.selected_label = Some(label);
        self.distraction_count = 0;
        Ok(event)
    }

    /// Manual stop. The timer is idle afterwards whatever the outcome;
    /// a run under one second yields `SessionError::TooShort`.
    pub fn stop(&mut self, at: DateTime<Utc>) -> Result<SessionDraft, CoreError> {
        let started_at = self.engine.started_at();
        self.engine.stop(at)?;
        // A successful stop implies the run had a start stamp.
        let started_at = started_at.unwrap_or(at);
        Ok(self.record_stop(started_at, at)?)
    }

    /// One second passed. On countdown completion the run is recorded as if
    /// stopped, and the returned events say whether a draft is pending.
    pub fn tick(&mut self, at: DateTime<Utc>) -> Result<Vec<Event>, TimerError> {
        let Some(completed) = self.engine.tick(at)? else {
            return Ok(Vec::new());
        };

        let mut events = vec![completed.clone()];
        if let Event::TimerCompleted {
            started_at,
            stop_at,
            ..
        } = completed
        {
            events.push(match self.record_stop(started_at, stop_at) {
                Ok(draft) => Event::SessionPending {
                    label_text: draft.label_text,
                    elapsed_secs: draft.elapsed_secs,
                },
                Err(rejected) => Event::SessionRejected {
                    reason: rejected.to_string(),
                },
            });
        }
        Ok(events)
    }

    pub fn set_mode(&mut self, mode: TimerMode) -> Result<Event, TimerError> {
        self.engine.set_mode(mode)
    }

    pub fn set_configured_minutes(&mut self, minutes: u64) -> Result<Event, TimerError> {
        self.engine.set_configured_minutes(minutes)
    }

    pub fn record_distraction(&mut self) -> Result<Event, TimerError> {
        if !self.engine.is_running() {
            return Err(TimerError::IllegalTransition {
                action: "record distraction",
                state: TimerStatus::Idle,
            });
        }
        self.distraction_count += 1;
        Ok(Event::DistractionRecorded {
            count: self.distraction_count,
        })
    }

    /// Finalize the pending draft into a record ready for persistence.
    ///
    /// An out-of-range percentage leaves the draft pending.
    pub fn submit_productivity(
        &mut self,
        percent: u32,
        user_id: &str,
    ) -> Result<SessionRecord, CoreError> {
        let percent = validate_percent(percent)?;
        let draft = self.pending.take().ok_or(SessionError::NoPendingSession)?;
        Ok(SessionRecord::finalize(
            draft,
            user_id,
            percent,
            self.distraction_count,
        ))
    }

    fn record_stop(
        &mut self,
        started_at: DateTime<Utc>,
        stop_at: DateTime<Utc>,
    ) -> Result<SessionDraft, SessionError> {
        let label = self.selected_label.clone().unwrap_or_default();
        match on_stop(started_at, stop_at, &label) {
            Ok(draft) => {
                tracing::info!(
                    label = %draft.label_text,
                    elapsed_secs = draft.elapsed_secs,
                    "session awaiting productivity input"
                );
                self.pending = Some(draft.clone());
                Ok(draft)
            }
            Err(rejected) => {
                tracing::info!(%rejected, "session not recorded");
                Err(rejected)
            }
        }
    }
}
