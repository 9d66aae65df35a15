use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::format::parse_clock;
use crate::session::SessionRecord;

/// A `studysession` row as exchanged with the backend.
///
/// Field names on the wire follow the backend's column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRow {
    #[serde(rename = "sessionid")]
    pub session_id: String,
    #[serde(rename = "id")]
    pub user_id: String,
    #[serde(rename = "starttime")]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "stoptime")]
    pub stop_time: DateTime<Utc>,
    /// `HH:MM:SS`
    #[serde(rename = "elapsedtime")]
    pub elapsed_time: String,
    pub label_text: String,
    #[serde(rename = "actualproductivity")]
    pub actual_productivity: i64,
    #[serde(rename = "totaldistractions")]
    pub total_distractions: i64,
    pub efficiency: i64,
}

impl From<&SessionRecord> for SessionRow {
    fn from(record: &SessionRecord) -> Self {
        Self {
            session_id: record.id.to_string(),
            user_id: record.user_id.clone(),
            start_time: record.start_time,
            stop_time: record.stop_time,
            elapsed_time: record.elapsed_clock(),
            label_text: record.label_text.clone(),
            actual_productivity: i64::from(record.actual_productivity_percent),
            total_distractions: i64::from(record.distraction_count),
            efficiency: record.efficiency_score,
        }
    }
}

impl TryFrom<SessionRow> for SessionRecord {
    type Error = ValidationError;

    /// Rows written by older clients may carry a malformed `elapsedtime`;
    /// those fall back to the start/stop stamps.
    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let invalid = |field: &str, message: String| ValidationError::InvalidValue {
            field: field.to_string(),
            message,
        };

        let id = Uuid::parse_str(&row.session_id)
            .map_err(|e| invalid("sessionid", e.to_string()))?;

        let elapsed_secs = match parse_clock(&row.elapsed_time) {
            Ok(secs) => secs,
            Err(_) => u64::try_from((row.stop_time - row.start_time).num_seconds())
                .map_err(|_| invalid("elapsedtime", format!("'{}'", row.elapsed_time)))?,
        };
        if elapsed_secs < 1 {
            return Err(invalid("elapsedtime", "session shorter than one second".into()));
        }

        let actual_productivity_percent = u8::try_from(row.actual_productivity)
            .ok()
            .filter(|p| *p <= 100)
            .ok_or_else(|| invalid("actualproductivity", row.actual_productivity.to_string()))?;
        let distraction_count = u32::try_from(row.total_distractions)
            .map_err(|_| invalid("totaldistractions", row.total_distractions.to_string()))?;

        Ok(SessionRecord {
            id,
            user_id: row.user_id,
            start_time: row.start_time,
            stop_time: row.stop_time,
            elapsed_secs,
            label_text: row.label_text,
            actual_productivity_percent,
            distraction_count,
            efficiency_score: row.efficiency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionDraft;
    use chrono::Duration;

    fn record() -> SessionRecord {
        let start = DateTime::parse_from_rfc3339("2026-03-04T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let draft = SessionDraft {
            start_time: start,
            stop_time: start + Duration::seconds(125),
            elapsed_secs: 125,
            label_text: "Math".into(),
        };
        SessionRecord::finalize(draft, "user-1", 90, 3)
    }

    #[test]
    fn wire_names_match_backend_columns() {
        let row = SessionRow::from(&record());
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["elapsedtime"], "00:02:05");
        assert_eq!(json["id"], "user-1");
        assert_eq!(json["label_text"], "Math");
        assert_eq!(json["actualproductivity"], 90);
        assert_eq!(json["totaldistractions"], 3);
        assert_eq!(json["efficiency"], -4);
        assert_eq!(json["starttime"], "2026-03-04T09:00:00Z");
    }

    #[test]
    fn malformed_elapsed_falls_back_to_stamps() {
        let mut row = SessionRow::from(&record());
        row.elapsed_time = "temporary".into();
        let back = SessionRecord::try_from(row).unwrap();
        assert_eq!(back.elapsed_secs, 125);
    }

    #[test]
    fn out_of_range_percent_is_rejected() {
        let mut row = SessionRow::from(&record());
        row.actual_productivity = 140;
        assert!(SessionRecord::try_from(row).is_err());
    }
}
