//! Turns a start/stop pair into a session draft.

use chrono::{DateTime, Utc};

use super::record::SessionDraft;
use crate::error::SessionError;

/// Shortest session that is ever recorded, in milliseconds.
pub const MIN_ELAPSED_MS: i64 = 1000;

/// Compute `floor((stop_at - started_at) / 1s)` and build a draft.
///
/// Anything under one second is rejected with [`SessionError::TooShort`];
/// the caller shows the notice and persists nothing. A stop must always
/// follow a start; there is no stop-without-start path here.
pub fn on_stop(
    started_at: DateTime<Utc>,
    stop_at: DateTime<Utc>,
    label_text: &str,
) -> Result<SessionDraft, SessionError> {
    let elapsed_ms = (stop_at - started_at).num_milliseconds();
    if elapsed_ms < MIN_ELAPSED_MS {
        return Err(SessionError::TooShort { elapsed_ms });
    }

    Ok(SessionDraft {
        start_time: started_at,
        stop_time: stop_at,
        elapsed_secs: (elapsed_ms / 1000) as u64,
        label_text: label_text.to_string(),
    })
}
