//! Runner phases

use std::fmt;

use serde::{Deserialize, Serialize};

/// What the runner is doing right now. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Not running: before start, after stop, or after completion
    #[default]
    Idle,
    /// Preparing for the next stretch
    Transition,
    /// Switching to the next side or repetition of the same stretch
    SideTransition,
    /// Timing the stretch itself
    Hold,
}

impl Phase {
    /// True while a routine is in progress
    pub fn is_active(&self) -> bool {
        !matches!(self, Phase::Idle)
    }

    /// True for the "get ready" phases
    pub fn is_preparing(&self) -> bool {
        matches!(self, Phase::Transition | Phase::SideTransition)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Transition => "transition",
            Phase::SideTransition => "side-transition",
            Phase::Hold => "hold",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
