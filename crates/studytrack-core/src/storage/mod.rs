mod config;
pub mod database;
mod row;

pub use config::{Config, LabelSeed, TimerConfig, UserConfig};
pub use database::Database;
pub use row::SessionRow;

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::error::DatabaseError;
use crate::productivity::LabelProductivityMap;
use crate::session::SessionRecord;

/// Returns `~/.config/studytrack[-dev]/` based on STUDYTRACK_ENV.
///
/// Set STUDYTRACK_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("STUDYTRACK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("studytrack-dev")
    } else {
        base_dir.join("studytrack")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Backend collaborator for finalized sessions and the label table.
pub trait SessionStore {
    fn insert_session(&self, record: &SessionRecord) -> Result<(), DatabaseError>;

    /// Rows whose start time lies in `[start, end]`, oldest first.
    fn sessions_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SessionRow>, DatabaseError>;

    /// Returns `false` when no row had that id.
    fn delete_session(&self, session_id: &str) -> Result<bool, DatabaseError>;

    fn label_productivity_map(&self, user_id: &str) -> Result<LabelProductivityMap, DatabaseError>;
}
