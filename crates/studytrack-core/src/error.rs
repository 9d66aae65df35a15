//! Core error types for studytrack-core.
//!
//! This module defines the error hierarchy using thiserror. Timer and
//! session errors describe rejected user actions; database and config
//! errors describe collaborator failures.

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::TimerStatus;

/// Core error type for studytrack-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Illegal timer transition or bad duration
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Session recording rejected
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// The insert/read call to the session store failed
    #[error("Persistence failure: {0}")]
    Persistence(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Malformed duration text
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Timer state machine errors.
///
/// An illegal transition is a caller bug: the UI only offers actions that
/// are legal in the current state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("cannot {action} while timer is {state:?}")]
    IllegalTransition {
        action: &'static str,
        state: TimerStatus,
    },

    #[error("configured duration must be greater than zero")]
    InvalidDuration,
}

/// Session recording outcomes that do not produce a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Elapsed time under one second; nothing is persisted.
    #[error("Time elapsed too short ({elapsed_ms}ms)")]
    TooShort { elapsed_ms: i64 },

    /// Start requested before any label exists.
    #[error("No label selected: create a label before starting a session")]
    NoLabelSelected,

    /// Productivity submitted without a stopped session awaiting it.
    #[error("No stopped session is awaiting productivity input")]
    NoPendingSession,
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Duration text that is not `HH:MM:SS` / `MM:SS`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("malformed duration text: '{0}'")]
    Malformed(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Persistence(DatabaseError::from(err))
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
