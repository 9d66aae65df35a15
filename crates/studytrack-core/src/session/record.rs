use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::format::format_clock;
use crate::productivity::compute_efficiency;

/// A stop that passed the minimum-duration check, waiting for the
/// productivity fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDraft {
    pub start_time: DateTime<Utc>,
    pub stop_time: DateTime<Utc>,
    pub elapsed_secs: u64,
    pub label_text: String,
}

/// The persisted session. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub stop_time: DateTime<Utc>,
    /// Always >= 1.
    pub elapsed_secs: u64,
    pub label_text: String,
    pub actual_productivity_percent: u8,
    pub distraction_count: u32,
    pub efficiency_score: i64,
}

impl SessionRecord {
    /// Fill in the productivity fields and derive the efficiency score.
    pub fn finalize(
        draft: SessionDraft,
        user_id: impl Into<String>,
        actual_productivity_percent: u8,
        distraction_count: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            start_time: draft.start_time,
            stop_time: draft.stop_time,
            elapsed_secs: draft.elapsed_secs,
            label_text: draft.label_text,
            actual_productivity_percent,
            distraction_count,
            efficiency_score: compute_efficiency(actual_productivity_percent, distraction_count),
        }
    }

    /// `HH:MM:SS`, the form stored in the `elapsedtime` column.
    pub fn elapsed_clock(&self) -> String {
        format_clock(self.elapsed_secs, false)
    }
}
