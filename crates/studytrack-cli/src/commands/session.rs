use clap::Subcommand;
use studytrack_core::{Config, SessionStore};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Print one recorded session as JSON
    Show {
        /// Session ID
        id: String,
    },
    /// Delete a recorded session
    Delete {
        /// Session ID
        id: String,
    },
}

pub fn run(action: SessionAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let db = super::open_database(config)?;

    match action {
        SessionAction::Show { id } => match db.session(&id)? {
            Some(row) => println!("{}", serde_json::to_string_pretty(&row)?),
            None => return Err(format!("session not found: {id}").into()),
        },
        SessionAction::Delete { id } => {
            if !db.delete_session(&id)? {
                return Err(format!("session not found: {id}").into());
            }
            tracing::info!(session_id = %id, "session deleted");
            println!("deleted {id}");
        }
    }
    Ok(())
}
