//! State management module
//!
//! This module contains the routine runner state machine, its phases,
//! events, clocks and the read-only snapshot handed to presentation.

pub mod clock;
pub mod events;
pub mod phase;
pub mod runner;
pub mod snapshot;

// Re-export main types
pub use clock::{Clock, ManualClock, PhaseClock, SystemClock};
pub use events::RunnerEvent;
pub use phase::Phase;
pub use runner::RoutineRunner;
pub use snapshot::{RoutineSnapshot, StretchSummary};
