//! SQLite-based session storage.
//!
//! Provides persistent storage for:
//! - Finalized study sessions (`studysession`)
//! - The per-user label table (`label`)

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{data_dir, SessionRow, SessionStore};
use crate::error::{CoreError, DatabaseError};
use crate::labels::Label;
use crate::productivity::LabelProductivityMap;
use crate::session::SessionRecord;

/// SQLite database for session storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/studytrack/studytrack.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created or the
    /// database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("studytrack.db");
        Ok(Self::open_at(path)?)
    }

    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        tracing::debug!(path = %path.display(), "session database opened");
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS studysession (
                    sessionid          TEXT PRIMARY KEY,
                    id                 TEXT NOT NULL,
                    starttime          TEXT NOT NULL,
                    stoptime           TEXT NOT NULL,
                    elapsedtime        TEXT NOT NULL,
                    label_text         TEXT NOT NULL DEFAULT '',
                    actualproductivity INTEGER NOT NULL,
                    totaldistractions  INTEGER NOT NULL,
                    efficiency         INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS label (
                    id            INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id       TEXT NOT NULL,
                    text          TEXT NOT NULL,
                    is_productive INTEGER NOT NULL DEFAULT 1,
                    UNIQUE (user_id, text)
                );

                CREATE INDEX IF NOT EXISTS idx_studysession_user_start ON studysession(id, starttime);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Insert or update a label. Used to seed the table; label editing
    /// itself lives with the backend.
    pub fn save_label(
        &self,
        user_id: &str,
        text: &str,
        is_productive: bool,
    ) -> Result<Label, DatabaseError> {
        self.conn.execute(
            "INSERT INTO label (user_id, text, is_productive) VALUES (?1, ?2, ?3)
             ON CONFLICT (user_id, text) DO UPDATE SET is_productive = excluded.is_productive",
            params![user_id, text, is_productive],
        )?;
        let id = self.conn.query_row(
            "SELECT id FROM label WHERE user_id = ?1 AND text = ?2",
            params![user_id, text],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(Label {
            id,
            user_id: user_id.to_string(),
            text: text.to_string(),
            is_productive,
        })
    }

    pub fn labels(&self, user_id: &str) -> Result<Vec<Label>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, text, is_productive FROM label
             WHERE user_id = ?1
             ORDER BY text",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok(Label {
                id: row.get(0)?,
                user_id: row.get(1)?,
                text: row.get(2)?,
                is_productive: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn session(&self, session_id: &str) -> Result<Option<SessionRow>, DatabaseError> {
        let row = self
            .conn
            .query_row(
                "SELECT sessionid, id, starttime, stoptime, elapsedtime, label_text,
                        actualproductivity, totaldistractions, efficiency
                 FROM studysession WHERE sessionid = ?1",
                params![session_id],
                session_row,
            )
            .optional()?;
        Ok(row)
    }
}

impl SessionStore for Database {
    fn insert_session(&self, record: &SessionRecord) -> Result<(), DatabaseError> {
        let row = SessionRow::from(record);
        self.conn.execute(
            "INSERT INTO studysession (sessionid, id, starttime, stoptime, elapsedtime,
                                       label_text, actualproductivity, totaldistractions, efficiency)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                row.session_id,
                row.user_id,
                timestamp(row.start_time),
                timestamp(row.stop_time),
                row.elapsed_time,
                row.label_text,
                row.actual_productivity,
                row.total_distractions,
                row.efficiency,
            ],
        )?;
        Ok(())
    }

    fn sessions_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SessionRow>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT sessionid, id, starttime, stoptime, elapsedtime, label_text,
                    actualproductivity, totaldistractions, efficiency
             FROM studysession
             WHERE id = ?1 AND starttime >= ?2 AND starttime <= ?3
             ORDER BY starttime ASC",
        )?;
        let rows = stmt.query_map(
            params![user_id, timestamp(start), timestamp(end)],
            session_row,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn delete_session(&self, session_id: &str) -> Result<bool, DatabaseError> {
        let n = self.conn.execute(
            "DELETE FROM studysession WHERE sessionid = ?1",
            params![session_id],
        )?;
        Ok(n > 0)
    }

    fn label_productivity_map(&self, user_id: &str) -> Result<LabelProductivityMap, DatabaseError> {
        Ok(self.labels(user_id)?.iter().collect())
    }
}

/// Fixed-width UTC text so lexical order matches time order.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(idx: usize, text: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn session_row(row: &Row<'_>) -> rusqlite::Result<SessionRow> {
    Ok(SessionRow {
        session_id: row.get(0)?,
        user_id: row.get(1)?,
        start_time: parse_timestamp(2, row.get(2)?)?,
        stop_time: parse_timestamp(3, row.get(3)?)?,
        elapsed_time: row.get(4)?,
        label_text: row.get(5)?,
        actual_productivity: row.get(6)?,
        total_distractions: row.get(7)?,
        efficiency: row.get(8)?,
    })
}
