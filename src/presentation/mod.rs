//! Presentation module
//!
//! Everything that turns runner output into something a person sees or
//! hears: view models, audio cues and the terminal renderer.

pub mod cues;
pub mod terminal;
pub mod view;

// Re-export main types
pub use cues::{cue_task, Cue, CuePattern, CuePolicy, CueSink, SilentSink, TerminalBell};
pub use terminal::{render_task, OutputMode, TerminalRenderer};
pub use view::{format_time, routine_list, DisplayText, EntryStatus, ListEntry};
