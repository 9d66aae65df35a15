//! # StudyTrack Core Library
//!
//! Timing and productivity accounting for study sessions. The CLI binary is
//! a thin layer over this crate; every operation lives here.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a wall-clock-stamped two-state machine (Idle/Running)
//!   that the caller drives with one-second ticks
//! - **Sessions**: stop-time validation, productivity input and the
//!   finalized record handed to the store
//! - **Statistics**: per-label and productive/not-productive totals for a
//!   day, ISO week, month or year, plus the daily timeline
//! - **Storage**: SQLite-based session storage and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`TimerController`]: Owns the tick task and broadcasts [`Event`]s
//! - [`StudyTracker`]: The user-facing actions of one study timer
//! - [`Database`]: Session persistence behind [`SessionStore`]
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod format;
pub mod labels;
pub mod productivity;
pub mod session;
pub mod stats;
pub mod storage;
pub mod timer;

pub use error::{
    ConfigError, CoreError, DatabaseError, FormatError, SessionError, TimerError, ValidationError,
};
pub use events::Event;
pub use format::{format_clock, format_human, format_human_long};
pub use labels::{Label, LabelFeed};
pub use productivity::{classify, compute_efficiency, LabelProductivityMap, Productivity};
pub use session::{SessionDraft, SessionRecord, StudyTracker};
pub use stats::{AggregationBucket, Timeframe, TimelineEntry};
pub use storage::{Config, Database, SessionRow, SessionStore};
pub use timer::{TimerController, TimerEngine, TimerMode, TimerState, TimerStatus};
