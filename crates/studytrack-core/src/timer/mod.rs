mod clock;
mod controller;
mod engine;
mod mode;
mod ticker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::TimerController;
pub use engine::{TimerEngine, TimerState, TimerStatus, DEFAULT_CONFIGURED_SECS};
pub use mode::{PhaseTag, PomodoroPair, TimerMode};
pub use ticker::Ticker;
