//! Background tasks module
//!
//! This module contains the session task that owns the runner and the
//! progress refresh task that runs alongside it.

pub mod progress;
pub mod session;

// Re-export main types
pub use progress::progress_task;
pub use session::{Command, Session, SessionControls, SessionOptions, SessionOutcome};
