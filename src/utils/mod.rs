//! Utility functions module
//!
//! This module contains process-level helpers used by the binary.

pub mod keyboard;
pub mod signals;

// Re-export main functions
pub use keyboard::{parse_command, spawn_keyboard_reader};
pub use signals::shutdown_signal;
