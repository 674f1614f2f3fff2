//! Read-only view of the runner for presentation

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{clock::PhaseClock, Phase};
use crate::routine::StretchDefinition;

/// Display-relevant parts of the active stretch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StretchSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub target_areas: Vec<String>,
}

impl From<&StretchDefinition> for StretchSummary {
    fn from(stretch: &StretchDefinition) -> Self {
        Self {
            id: stretch.id().to_string(),
            name: stretch.name().to_string(),
            description: stretch.description().to_string(),
            target_areas: stretch.target_areas().to_vec(),
        }
    }
}

/// Point-in-time copy of everything a display needs
#[derive(Debug, Clone, Serialize)]
pub struct RoutineSnapshot {
    pub phase: Phase,
    pub stretch_index: usize,
    pub stretch_count: usize,
    /// `None` once the routine has completed
    pub stretch: Option<StretchSummary>,
    pub side: Option<String>,
    /// Zero-based repetition index
    pub repetition: u32,
    pub repetitions: u32,
    pub time_remaining: u32,
    pub total_time: u32,
    pub total_time_remaining: u64,
    pub progress: f64,
    pub paused: bool,
    pub complete: bool,
    pub captured_at: DateTime<Utc>,
    /// Kept for progress interpolation between snapshots
    #[serde(skip)]
    pub clock: PhaseClock,
}
