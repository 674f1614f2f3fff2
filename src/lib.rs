//! Stretch Timer - A guided stretching-routine timer
//!
//! This library walks a user through an ordered routine of stretches,
//! with transitions between stretches, sides and repetitions. The phase
//! state machine lives in [`state`]; everything else feeds it ticks or
//! presents what it reports.

pub mod config;
pub mod error;
pub mod presentation;
pub mod routine;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::RoutineError;
pub use routine::{load_routine, PhaseTiming, Routine, StretchConfig, StretchDefinition};
pub use state::{Phase, RoutineRunner, RoutineSnapshot, RunnerEvent};
pub use tasks::{Session, SessionOutcome};
pub use utils::signals::shutdown_signal;
