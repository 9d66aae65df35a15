use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::timeframe::Timeframe;
use crate::format::format_human_long;
use crate::productivity::{classify, LabelProductivityMap, Productivity};
use crate::session::SessionRecord;

/// Sum elapsed seconds per label. Labels without sessions are absent.
pub fn aggregate_by_label(sessions: &[SessionRecord]) -> BTreeMap<String, u64> {
    let mut totals = BTreeMap::new();
    for session in sessions {
        *totals.entry(session.label_text.clone()).or_insert(0) += session.elapsed_secs;
    }
    totals
}

/// `(productive_secs, not_productive_secs)`.
pub fn aggregate_by_productivity(
    sessions: &[SessionRecord],
    labels: &LabelProductivityMap,
) -> (u64, u64) {
    sessions
        .iter()
        .fold((0, 0), |(productive, not_productive), session| {
            match classify(session, labels) {
                Productivity::Productive => (productive + session.elapsed_secs, not_productive),
                Productivity::NotProductive => (productive, not_productive + session.elapsed_secs),
            }
        })
}

/// Rollup for one timeframe. The caller passes sessions already scoped to
/// the timeframe's bounds; nothing is filtered here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationBucket {
    pub timeframe: Timeframe,
    pub anchor_date: NaiveDate,
    pub per_label_total_secs: BTreeMap<String, u64>,
    pub productive_total_secs: u64,
    pub not_productive_total_secs: u64,
}

impl AggregationBucket {
    pub fn compute(
        timeframe: Timeframe,
        anchor_date: NaiveDate,
        sessions: &[SessionRecord],
        labels: &LabelProductivityMap,
    ) -> Self {
        let (productive_total_secs, not_productive_total_secs) =
            aggregate_by_productivity(sessions, labels);
        Self {
            timeframe,
            anchor_date,
            per_label_total_secs: aggregate_by_label(sessions),
            productive_total_secs,
            not_productive_total_secs,
        }
    }

    pub fn total_secs(&self) -> u64 {
        self.productive_total_secs + self.not_productive_total_secs
    }

    /// Human-readable totals for display.
    pub fn summary(&self) -> BucketSummary {
        BucketSummary {
            timeframe: self.timeframe,
            anchor_date: self.anchor_date,
            total: format_human_long(self.total_secs()),
            productive: format_human_long(self.productive_total_secs),
            not_productive: format_human_long(self.not_productive_total_secs),
            per_label: self
                .per_label_total_secs
                .iter()
                .map(|(label, secs)| (label.clone(), format_human_long(*secs)))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSummary {
    pub timeframe: Timeframe,
    pub anchor_date: NaiveDate,
    pub total: String,
    pub productive: String,
    pub not_productive: String,
    pub per_label: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn session(label: &str, elapsed_secs: u64) -> SessionRecord {
        let start = Utc::now();
        SessionRecord {
            id: Uuid::new_v4(),
            user_id: "u1".into(),
            start_time: start,
            stop_time: start + Duration::seconds(elapsed_secs as i64),
            elapsed_secs,
            label_text: label.into(),
            actual_productivity_percent: 100,
            distraction_count: 0,
            efficiency_score: 0,
        }
    }

    fn labels() -> LabelProductivityMap {
        [("Math".to_string(), true), ("History".to_string(), false)]
            .into_iter()
            .collect()
    }

    #[test]
    fn math_and_history_rollup() {
        let sessions = vec![
            session("Math", 600),
            session("Math", 300),
            session("History", 120),
        ];

        let by_label = aggregate_by_label(&sessions);
        assert_eq!(by_label.len(), 2);
        assert_eq!(by_label["Math"], 900);
        assert_eq!(by_label["History"], 120);

        assert_eq!(aggregate_by_productivity(&sessions, &labels()), (900, 120));
    }

    #[test]
    fn unknown_labels_land_in_not_productive() {
        let sessions = vec![session("Math", 60), session("Chess", 30)];
        assert_eq!(aggregate_by_productivity(&sessions, &labels()), (60, 30));
    }

    #[test]
    fn empty_input_is_empty_bucket() {
        let anchor = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        let bucket = AggregationBucket::compute(Timeframe::Day, anchor, &[], &labels());
        assert!(bucket.per_label_total_secs.is_empty());
        assert_eq!(bucket.total_secs(), 0);
        assert_eq!(bucket.summary().total, "0sec");
    }

    #[test]
    fn summary_uses_day_tier() {
        let anchor = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        let sessions = vec![session("Math", 86_400 + 3600), session("History", 90)];
        let summary =
            AggregationBucket::compute(Timeframe::Month, anchor, &sessions, &labels()).summary();
        assert_eq!(summary.productive, "1 days 1hr");
        assert_eq!(summary.not_productive, "1min 30sec");
        assert_eq!(summary.per_label["History"], "1min 30sec");
    }
}
