pub mod config;
pub mod session;
pub mod stats;
pub mod timeline;
pub mod timer;

use chrono::{Local, NaiveDate};
use studytrack_core::error::DatabaseError;
use studytrack_core::{Config, Database, SessionRecord, SessionRow};

/// Open the session database, seeding the label table from config for a
/// user who has none yet.
pub fn open_database(config: &Config) -> Result<Database, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    seed_labels(&db, config)?;
    Ok(db)
}

fn seed_labels(db: &Database, config: &Config) -> Result<(), DatabaseError> {
    if !db.labels(&config.user.id)?.is_empty() {
        return Ok(());
    }
    for seed in &config.labels {
        db.save_label(&config.user.id, &seed.text, seed.productive)?;
    }
    tracing::info!(user = %config.user.id, count = config.labels.len(), "seeded labels");
    Ok(())
}

pub fn today_or(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

/// Rows that cannot be read back as records are logged and skipped.
pub fn readable_records(rows: Vec<SessionRow>) -> Vec<SessionRecord> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.session_id.clone();
            match SessionRecord::try_from(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(session_id = %id, error = %e, "skipping unreadable session");
                    None
                }
            }
        })
        .collect()
}
