use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Day,
    Week,
    Month,
    Year,
}

impl std::str::FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(Timeframe::Day),
            "week" => Ok(Timeframe::Week),
            "month" => Ok(Timeframe::Month),
            "year" => Ok(Timeframe::Year),
            other => Err(format!("unknown timeframe: {other}")),
        }
    }
}

/// Inclusive calendar range, millisecond resolution on the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeframeBounds {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeframeBounds {
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at <= self.end
    }

    /// Resolve the local calendar range in `tz` to UTC instants, for the
    /// store's range query. Ambiguous local times take the earliest mapping.
    /// A start inside a DST gap moves forward to the first existing instant,
    /// an end inside one moves back, so the range never leaves its days.
    pub fn to_utc<Tz: TimeZone>(&self, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        let lookup = |local: &NaiveDateTime| {
            tz.from_local_datetime(local)
                .map(|dt| dt.with_timezone(&Utc))
        };
        let step = Duration::minutes(GAP_STEP_MINUTES);
        (
            resolve_with(self.start, step, lookup),
            resolve_with(self.end, -step, lookup),
        )
    }
}

/// Offset changes happen on quarter-hour boundaries.
const GAP_STEP_MINUTES: i64 = 15;

/// A day's worth of steps covers the longest recorded gap.
const MAX_GAP_STEPS: u32 = 24 * 4;

fn resolve_with<F>(naive: NaiveDateTime, step: Duration, lookup: F) -> DateTime<Utc>
where
    F: Fn(&NaiveDateTime) -> LocalResult<DateTime<Utc>>,
{
    let mut local = naive;
    for _ in 0..=MAX_GAP_STEPS {
        if let Some(dt) = lookup(&local).earliest() {
            return dt;
        }
        match local.checked_add_signed(step) {
            Some(next) => local = next,
            None => break,
        }
    }
    tracing::debug!(%naive, "local time unresolvable, reading as UTC");
    Utc.from_utc_datetime(&naive)
}

/// Start and end of the day/ISO week/month/year containing `anchor`.
///
/// # Errors
/// Returns [`ValidationError::InvalidValue`] when the range reaches past the
/// last representable date.
pub fn timeframe_bounds(
    timeframe: Timeframe,
    anchor: NaiveDate,
) -> Result<TimeframeBounds, ValidationError> {
    let out_of_range = || ValidationError::InvalidValue {
        field: "date".into(),
        message: format!("{anchor} is outside the supported calendar range"),
    };

    let (first, last) = match timeframe {
        Timeframe::Day => (anchor, anchor),
        Timeframe::Week => {
            let back = Duration::days(i64::from(anchor.weekday().num_days_from_monday()));
            let monday = anchor.checked_sub_signed(back).ok_or_else(out_of_range)?;
            let sunday = monday
                .checked_add_signed(Duration::days(6))
                .ok_or_else(out_of_range)?;
            (monday, sunday)
        }
        Timeframe::Month => {
            let first = anchor.with_day(1).ok_or_else(out_of_range)?;
            let last = if anchor.month() == 12 {
                NaiveDate::from_ymd_opt(anchor.year(), 12, 31)
            } else {
                NaiveDate::from_ymd_opt(anchor.year(), anchor.month() + 1, 1)
                    .and_then(|next| next.pred_opt())
            };
            (first, last.ok_or_else(out_of_range)?)
        }
        Timeframe::Year => {
            let first = NaiveDate::from_ymd_opt(anchor.year(), 1, 1);
            let last = NaiveDate::from_ymd_opt(anchor.year(), 12, 31);
            (
                first.ok_or_else(out_of_range)?,
                last.ok_or_else(out_of_range)?,
            )
        }
    };

    Ok(TimeframeBounds {
        start: first.and_time(NaiveTime::MIN),
        end: last
            .and_hms_milli_opt(23, 59, 59, 999)
            .ok_or_else(out_of_range)?,
    })
}
