use std::fmt::Display;

use chrono::TimeZone;
use serde::{Deserialize, Serialize};

use crate::format::describe_elapsed_text;
use crate::storage::SessionRow;

/// One line of the daily session timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub session_id: String,
    /// Local start time, `HH:MM`.
    pub time: String,
    pub title: String,
    pub description: String,
}

/// Timeline entries ordered by start time, rendered in `tz`.
pub fn daily_timeline<Tz>(rows: &[SessionRow], tz: &Tz) -> Vec<TimelineEntry>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut ordered: Vec<&SessionRow> = rows.iter().collect();
    ordered.sort_by_key(|row| row.start_time);

    ordered
        .into_iter()
        .map(|row| TimelineEntry {
            session_id: row.session_id.clone(),
            time: row.start_time.with_timezone(tz).format("%H:%M").to_string(),
            title: row.label_text.clone(),
            description: describe_elapsed_text(&row.elapsed_time),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, Utc};

    fn row(id: &str, start: &str, elapsed: &str, label: &str) -> SessionRow {
        let start_time = DateTime::parse_from_rfc3339(start)
            .unwrap()
            .with_timezone(&Utc);
        SessionRow {
            session_id: id.into(),
            user_id: "u1".into(),
            start_time,
            stop_time: start_time,
            elapsed_time: elapsed.into(),
            label_text: label.into(),
            actual_productivity: 100,
            total_distractions: 0,
            efficiency: 0,
        }
    }

    #[test]
    fn entries_sorted_and_described() {
        let rows = vec![
            row("b", "2026-03-04T14:30:00Z", "01:02:00", "History"),
            row("a", "2026-03-04T09:05:00Z", "00:25:00", "Math"),
            row("c", "2026-03-04T20:00:00Z", "garbled", "Art"),
        ];
        let entries = daily_timeline(&rows, &Utc);

        let ids: Vec<_> = entries.iter().map(|e| e.session_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(entries[0].time, "09:05");
        assert_eq!(entries[0].title, "Math");
        assert_eq!(entries[0].description, "Elapsed Time: 25min");
        assert_eq!(entries[1].description, "Elapsed Time: 1hr 2min");
        assert_eq!(entries[2].description, "No elapsed time");
    }

    #[test]
    fn times_render_in_local_zone() {
        let rows = vec![row("a", "2026-03-04T09:05:00Z", "00:01:00", "Math")];
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(daily_timeline(&rows, &tz)[0].time, "04:05");
    }
}
