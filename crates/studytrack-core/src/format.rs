//! Duration formatting for timer displays and statistics.
//!
//! Two families of output:
//!
//! - clock text (`HH:MM:SS`, or `MM:SS` when hours are omitted), used for
//!   the live timer display and the stored `elapsedtime` column
//! - human text (`1hr 2min 3sec`), used for session descriptions and for
//!   day/week/month/year totals, where a `N days` tier is added
//!
//! Every function here is pure and total over `u64` seconds.

use crate::error::FormatError;

const SECS_PER_MIN: u64 = 60;
const SECS_PER_HOUR: u64 = 3600;
const SECS_PER_DAY: u64 = 86_400;

/// Format seconds as `HH:MM:SS`.
///
/// With `omit_hours_if_zero`, durations under one hour render as `MM:SS`.
pub fn format_clock(secs: u64, omit_hours_if_zero: bool) -> String {
    let hours = secs / SECS_PER_HOUR;
    let minutes = (secs % SECS_PER_HOUR) / SECS_PER_MIN;
    let seconds = secs % SECS_PER_MIN;

    if omit_hours_if_zero && hours == 0 {
        format!("{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

/// Parse `HH:MM:SS` (or `MM:SS`) back into seconds.
///
/// Minutes and seconds must be below 60; hours are unbounded.
pub fn parse_clock(text: &str) -> Result<u64, FormatError> {
    let malformed = || FormatError::Malformed(text.to_string());

    let fields = text
        .trim()
        .split(':')
        .map(|part| part.parse::<u64>().map_err(|_| malformed()))
        .collect::<Result<Vec<_>, _>>()?;

    let (hours, minutes, seconds) = match fields.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [m, s] => (0, *m, *s),
        _ => return Err(malformed()),
    };

    if minutes >= 60 || seconds >= 60 {
        return Err(malformed());
    }

    hours
        .checked_mul(SECS_PER_HOUR)
        .and_then(|h| h.checked_add(minutes * SECS_PER_MIN + seconds))
        .ok_or_else(malformed)
}

/// Compact `{N}hr {N}min {N}sec`, dropping zero components.
///
/// Returns `"0sec"` for zero.
pub fn format_human(secs: u64) -> String {
    let parts = human_parts(secs);
    if parts.is_empty() {
        "0sec".to_string()
    } else {
        parts.join(" ")
    }
}

/// Like [`format_human`] but with a leading `{N} days` tier once the
/// duration reaches 24 hours. Used for aggregate totals.
pub fn format_human_long(secs: u64) -> String {
    let days = secs / SECS_PER_DAY;
    if days == 0 {
        return format_human(secs);
    }

    let mut parts = vec![format!("{days} days")];
    parts.extend(human_parts(secs % SECS_PER_DAY));
    parts.join(" ")
}

/// Timeline description for a stored `elapsedtime` value.
pub fn describe_elapsed_text(text: &str) -> String {
    match parse_clock(text) {
        Ok(secs) => format!("Elapsed Time: {}", format_human(secs)),
        Err(_) => "No elapsed time".to_string(),
    }
}

fn human_parts(secs: u64) -> Vec<String> {
    let hours = secs / SECS_PER_HOUR;
    let minutes = (secs % SECS_PER_HOUR) / SECS_PER_MIN;
    let seconds = secs % SECS_PER_MIN;

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(format!("{hours}hr"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}min"));
    }
    if seconds > 0 {
        parts.push(format!("{seconds}sec"));
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clock_pads_every_field() {
        assert_eq!(format_clock(0, false), "00:00:00");
        assert_eq!(format_clock(125, false), "00:02:05");
        assert_eq!(format_clock(3661, false), "01:01:01");
    }

    #[test]
    fn clock_omits_zero_hours_on_request() {
        assert_eq!(format_clock(125, true), "02:05");
        assert_eq!(format_clock(3599, true), "59:59");
        assert_eq!(format_clock(3600, true), "01:00:00");
    }

    #[test]
    fn clock_hours_grow_past_two_digits() {
        assert_eq!(format_clock(100 * 3600, false), "100:00:00");
    }

    #[test]
    fn parse_accepts_short_form() {
        assert_eq!(parse_clock("02:05").unwrap(), 125);
        assert_eq!(parse_clock("01:00:00").unwrap(), 3600);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_clock("").is_err());
        assert!(parse_clock("1:2:3:4").is_err());
        assert!(parse_clock("00:61:00").is_err());
        assert!(parse_clock("ab:cd").is_err());
        assert!(parse_clock("-1:00:00").is_err());
    }

    #[test]
    fn human_drops_zero_components() {
        assert_eq!(format_human(0), "0sec");
        assert_eq!(format_human(59), "59sec");
        assert_eq!(format_human(3600), "1hr");
        assert_eq!(format_human(3605), "1hr 5sec");
        assert_eq!(format_human(3725), "1hr 2min 5sec");
    }

    #[test]
    fn human_long_adds_days_tier() {
        assert_eq!(format_human_long(3600), "1hr");
        assert_eq!(format_human_long(86_400), "1 days");
        assert_eq!(format_human_long(2 * 86_400 + 3 * 3600 + 4), "2 days 3hr 4sec");
    }

    #[test]
    fn elapsed_text_description() {
        assert_eq!(describe_elapsed_text("00:10:00"), "Elapsed Time: 10min");
        assert_eq!(describe_elapsed_text("n/a"), "No elapsed time");
    }

    proptest! {
        #[test]
        fn clock_round_trips(secs in 0u64..10_000_000) {
            prop_assert_eq!(parse_clock(&format_clock(secs, false)).unwrap(), secs);
        }

        #[test]
        fn hours_omitted_iff_under_an_hour(secs in 0u64..1_000_000) {
            let text = format_clock(secs, true);
            let has_hours = text.matches(':').count() == 2;
            prop_assert_eq!(!has_hours, secs < 3600);
        }
    }
}
