//! Events emitted by the runner at transition points

use serde::Serialize;

use super::Phase;

/// Something the presentation layer may want to react to.
///
/// The runner only says which event happened; tones, colours and text are
/// up to whoever consumes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum RunnerEvent {
    /// Routine started from the beginning
    Started { stretch_count: usize },
    /// A phase began
    PhaseEntered {
        phase: Phase,
        stretch_index: usize,
        duration: u32,
    },
    /// Next side or repetition selected; the side transition follows
    SideChanged {
        stretch_index: usize,
        side: Option<String>,
        repetition: u32,
    },
    /// All holds of a stretch finished
    StretchCompleted { stretch_index: usize },
    /// Terminal signal: the last hold of the last stretch finished
    RoutineCompleted,
    Paused,
    Resumed { paused_for_ms: u64 },
    /// Explicit stop before completion
    Stopped,
}
