//! Routine definitions module
//!
//! Stretch definitions, their validation, and loading routines from JSON.

pub mod definition;
pub mod loader;

// Re-export main types
pub use definition::{
    PhaseTiming, Routine, SideKind, StretchConfig, StretchDefinition,
    DEFAULT_SIDE_TRANSITION_SECONDS, DEFAULT_TRANSITION_SECONDS,
};
pub use loader::{builtin_stretches, load_routine, load_stretches, parse_stretches};
