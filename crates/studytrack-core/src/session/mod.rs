mod record;
mod recorder;
mod tracker;

pub use record::{SessionDraft, SessionRecord};
pub use recorder::{on_stop, MIN_ELAPSED_MS};
pub use tracker::StudyTracker;

use crate::error::CoreError;
use crate::storage::SessionStore;

/// Hand a finished record to the store.
///
/// Fire-and-forget from the timer's point of view: a failure is logged and
/// returned, never retried, and never touches timer state.
pub fn persist<S: SessionStore + ?Sized>(store: &S, record: &SessionRecord) -> Result<(), CoreError> {
    match store.insert_session(record) {
        Ok(()) => {
            tracing::info!(
                session_id = %record.id,
                label = %record.label_text,
                elapsed = %record.elapsed_clock(),
                efficiency = record.efficiency_score,
                "session persisted"
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(session_id = %record.id, error = %e, "failed to persist session");
            Err(CoreError::Persistence(e))
        }
    }
}
