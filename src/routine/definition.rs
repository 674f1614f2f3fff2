//! Stretch definitions and the validated routine

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::RoutineError;

/// Pause before each stretch when the stretch does not override it
pub const DEFAULT_TRANSITION_SECONDS: u32 = 10;
/// Pause between sides and between repetitions of one stretch
pub const DEFAULT_SIDE_TRANSITION_SECONDS: u32 = 5;

/// Which sequence of side labels a stretch walks through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SideKind {
    #[default]
    None,
    LeftRight,
    FrontBack,
    Custom,
}

/// Stretch as written in a routine file, before validation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StretchConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub target_areas: Vec<String>,
    pub duration_seconds: i64,
    #[serde(default)]
    pub transition_seconds: Option<i64>,
    #[serde(default)]
    pub sides: SideKind,
    #[serde(default)]
    pub side_names: Option<Vec<String>>,
    #[serde(default = "default_repetitions")]
    pub repetitions: i64,
}

fn default_repetitions() -> i64 {
    1
}

impl StretchConfig {
    /// Convenience constructor used by tests and callers building routines in code
    pub fn new(id: &str, name: &str, duration_seconds: i64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            target_areas: Vec::new(),
            duration_seconds,
            transition_seconds: None,
            sides: SideKind::None,
            side_names: None,
            repetitions: 1,
        }
    }

    pub fn with_sides(mut self, sides: SideKind) -> Self {
        self.sides = sides;
        self
    }

    pub fn with_side_names(mut self, names: &[&str]) -> Self {
        self.sides = SideKind::Custom;
        self.side_names = Some(names.iter().map(|n| n.to_string()).collect());
        self
    }

    pub fn with_repetitions(mut self, repetitions: i64) -> Self {
        self.repetitions = repetitions;
        self
    }

    pub fn with_transition(mut self, seconds: i64) -> Self {
        self.transition_seconds = Some(seconds);
        self
    }
}

fn positive(id: &str, field: &str, value: i64) -> Result<u32, RoutineError> {
    if value <= 0 {
        return Err(RoutineError::invalid(id, format!("{field} must be positive, got {value}")));
    }
    u32::try_from(value)
        .map_err(|_| RoutineError::invalid(id, format!("{field} is too large: {value}")))
}

/// A validated, immutable stretch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StretchDefinition {
    id: String,
    name: String,
    description: String,
    target_areas: Vec<String>,
    duration_seconds: u32,
    transition_seconds: Option<u32>,
    sides: SideKind,
    side_names: Vec<String>,
    repetitions: u32,
}

impl TryFrom<StretchConfig> for StretchDefinition {
    type Error = RoutineError;

    fn try_from(config: StretchConfig) -> Result<Self, Self::Error> {
        let id = config.id;
        if id.trim().is_empty() {
            return Err(RoutineError::invalid(&config.name, "id must not be empty"));
        }

        let duration_seconds = positive(&id, "durationSeconds", config.duration_seconds)?;
        let repetitions = positive(&id, "repetitions", config.repetitions)?;
        let transition_seconds = config
            .transition_seconds
            .map(|t| positive(&id, "transitionSeconds", t))
            .transpose()?;

        let side_names = match config.sides {
            SideKind::None => Vec::new(),
            SideKind::LeftRight => vec!["Left".to_string(), "Right".to_string()],
            SideKind::FrontBack => vec!["Front".to_string(), "Back".to_string()],
            SideKind::Custom => match config.side_names.as_deref() {
                Some(names) if !names.is_empty() => names.to_vec(),
                _ => {
                    return Err(RoutineError::invalid(&id, "custom sides require sideNames"));
                }
            },
        };
        if config.sides != SideKind::Custom && config.side_names.is_some() {
            warn!("Stretch {} lists sideNames without custom sides, ignoring them", id);
        }
        u32::try_from(side_names.len().max(1))
            .ok()
            .and_then(|sides| sides.checked_mul(repetitions))
            .ok_or_else(|| RoutineError::invalid(&id, "too many holds for sides × repetitions"))?;

        Ok(Self {
            id,
            name: config.name,
            description: config.description,
            target_areas: config.target_areas,
            duration_seconds,
            transition_seconds,
            sides: config.sides,
            side_names,
            repetitions,
        })
    }
}

impl StretchDefinition {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn target_areas(&self) -> &[String] {
        &self.target_areas
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    /// Per-stretch transition override, if any
    pub fn transition_seconds(&self) -> Option<u32> {
        self.transition_seconds
    }

    pub fn sides(&self) -> SideKind {
        self.sides
    }

    /// Ordered side labels; empty for `SideKind::None`
    pub fn side_names(&self) -> &[String] {
        &self.side_names
    }

    pub fn repetitions(&self) -> u32 {
        self.repetitions
    }

    /// Holds per repetition. A stretch without sides still has one.
    pub fn side_count(&self) -> u32 {
        (self.side_names.len() as u32).max(1)
    }

    /// Total hold phases: sides × repetitions
    pub fn hold_count(&self) -> u32 {
        self.side_count() * self.repetitions
    }
}

/// Routine-wide transition durations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTiming {
    pub transition_seconds: u32,
    pub side_transition_seconds: u32,
}

impl Default for PhaseTiming {
    fn default() -> Self {
        Self {
            transition_seconds: DEFAULT_TRANSITION_SECONDS,
            side_transition_seconds: DEFAULT_SIDE_TRANSITION_SECONDS,
        }
    }
}

impl PhaseTiming {
    fn validate(&self) -> Result<(), RoutineError> {
        if self.transition_seconds == 0 {
            return Err(RoutineError::invalid("<routine>", "transition must be at least 1 second"));
        }
        if self.side_transition_seconds == 0 {
            return Err(RoutineError::invalid(
                "<routine>",
                "side transition must be at least 1 second",
            ));
        }
        Ok(())
    }
}

/// Ordered, validated list of stretches. Immutable once built.
#[derive(Debug, Clone)]
pub struct Routine {
    stretches: Vec<StretchDefinition>,
    timing: PhaseTiming,
}

impl Routine {
    /// Validate every stretch and the timing. An empty list is allowed here;
    /// starting it is what fails.
    pub fn new(configs: Vec<StretchConfig>, timing: PhaseTiming) -> Result<Self, RoutineError> {
        timing.validate()?;

        let mut seen = HashSet::new();
        let mut stretches = Vec::with_capacity(configs.len());
        for config in configs {
            let stretch = StretchDefinition::try_from(config)?;
            if !seen.insert(stretch.id.clone()) {
                return Err(RoutineError::invalid(&stretch.id, "duplicate stretch id"));
            }
            stretches.push(stretch);
        }

        let routine = Self { stretches, timing };
        routine
            .stretches
            .iter()
            .try_fold(0u64, |total, s| total.checked_add(routine.checked_stretch_seconds(s)?))
            .ok_or_else(|| RoutineError::invalid("<routine>", "routine is too long"))?;
        Ok(routine)
    }

    pub fn stretches(&self) -> &[StretchDefinition] {
        &self.stretches
    }

    pub fn get(&self, index: usize) -> Option<&StretchDefinition> {
        self.stretches.get(index)
    }

    pub fn len(&self) -> usize {
        self.stretches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stretches.is_empty()
    }

    pub fn timing(&self) -> PhaseTiming {
        self.timing
    }

    /// Transition before `stretch`, honouring its override
    pub fn transition_for(&self, stretch: &StretchDefinition) -> u32 {
        stretch.transition_seconds.unwrap_or(self.timing.transition_seconds)
    }

    /// Full length of a stretch from the start of its transition to the end of its last hold
    pub fn stretch_seconds(&self, stretch: &StretchDefinition) -> u64 {
        let holds = u64::from(stretch.hold_count());
        u64::from(self.transition_for(stretch))
            + holds * u64::from(stretch.duration_seconds)
            + (holds - 1) * u64::from(self.timing.side_transition_seconds)
    }

    fn checked_stretch_seconds(&self, stretch: &StretchDefinition) -> Option<u64> {
        let holds = u64::from(stretch.hold_count());
        let holding = holds.checked_mul(u64::from(stretch.duration_seconds))?;
        let switching = (holds - 1).checked_mul(u64::from(self.timing.side_transition_seconds))?;
        u64::from(self.transition_for(stretch))
            .checked_add(holding)?
            .checked_add(switching)
    }

    /// Length of the whole routine when run without pauses
    pub fn total_seconds(&self) -> u64 {
        self.stretches.iter().map(|s| self.stretch_seconds(s)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routine(configs: Vec<StretchConfig>) -> Result<Routine, RoutineError> {
        Routine::new(configs, PhaseTiming::default())
    }

    #[test]
    fn side_kinds_resolve_to_labels() {
        let r = routine(vec![
            StretchConfig::new("a", "A", 60),
            StretchConfig::new("b", "B", 60).with_sides(SideKind::LeftRight),
            StretchConfig::new("c", "C", 60).with_sides(SideKind::FrontBack),
            StretchConfig::new("d", "D", 30).with_side_names(&["Cat", "Cow"]),
        ])
        .unwrap();

        assert!(r.stretches()[0].side_names().is_empty());
        assert_eq!(r.stretches()[0].side_count(), 1);
        assert_eq!(r.stretches()[1].sides(), SideKind::LeftRight);
        assert_eq!(r.stretches()[3].sides(), SideKind::Custom);
        assert_eq!(r.stretches()[1].side_names(), ["Left", "Right"]);
        assert_eq!(r.stretches()[2].side_names(), ["Front", "Back"]);
        assert_eq!(r.stretches()[3].side_names(), ["Cat", "Cow"]);
    }

    #[test]
    fn rejects_non_positive_durations() {
        for bad in [0, -5] {
            let err = routine(vec![StretchConfig::new("a", "A", bad)]).unwrap_err();
            assert!(matches!(err, RoutineError::InvalidDefinition { ref id, .. } if id == "a"));
        }
        let err = routine(vec![StretchConfig::new("a", "A", 60).with_repetitions(0)]).unwrap_err();
        assert!(err.to_string().contains("repetitions"));
        let err = routine(vec![StretchConfig::new("a", "A", 60).with_transition(0)]).unwrap_err();
        assert!(err.to_string().contains("transitionSeconds"));
    }

    #[test]
    fn custom_sides_need_names() {
        let mut config = StretchConfig::new("cat-cow", "Cat/Cow", 30).with_sides(SideKind::Custom);
        assert!(routine(vec![config.clone()]).is_err());
        config.side_names = Some(Vec::new());
        assert!(routine(vec![config]).is_err());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = routine(vec![
            StretchConfig::new("a", "A", 60),
            StretchConfig::new("a", "Again", 30),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn rejects_zero_timing() {
        let timing = PhaseTiming {
            transition_seconds: 10,
            side_transition_seconds: 0,
        };
        assert!(Routine::new(vec![StretchConfig::new("a", "A", 60)], timing).is_err());
    }

    #[test]
    fn rejects_hold_counts_that_overflow() {
        let err = routine(vec![StretchConfig::new("a", "A", 1)
            .with_sides(SideKind::LeftRight)
            .with_repetitions(2_147_483_648)])
        .unwrap_err();
        assert!(matches!(err, RoutineError::InvalidDefinition { ref id, .. } if id == "a"));

        let r = routine(vec![StretchConfig::new("a", "A", 1)
            .with_sides(SideKind::LeftRight)
            .with_repetitions(2_147_483_647)])
        .unwrap();
        assert_eq!(r.stretches()[0].hold_count(), u32::MAX - 1);
        assert_eq!(r.total_seconds(), 10 + u64::from(u32::MAX - 1) + u64::from(u32::MAX - 2) * 5);
    }

    #[test]
    fn rejects_routines_too_long_to_count() {
        let longest = || {
            StretchConfig::new("x", "X", i64::from(u32::MAX)).with_repetitions(i64::from(u32::MAX))
        };
        let configs = (0..3)
            .map(|i| StretchConfig { id: format!("x{i}"), ..longest() })
            .collect();
        let err = routine(configs).unwrap_err();
        assert!(err.to_string().contains("too long"));
    }

    #[test]
    fn empty_routine_loads() {
        assert!(routine(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn stretch_seconds_counts_side_transitions() {
        let r = routine(vec![
            StretchConfig::new("plank", "Plank", 60),
            StretchConfig::new("cat-cow", "Cat/Cow", 30)
                .with_side_names(&["Cat", "Cow"])
                .with_repetitions(2),
            StretchConfig::new("lunge", "Low Lunge", 60)
                .with_sides(SideKind::LeftRight)
                .with_transition(3),
        ])
        .unwrap();

        assert_eq!(r.stretches()[0].transition_seconds(), None);
        assert_eq!(r.stretches()[2].transition_seconds(), Some(3));
        assert_eq!(r.stretch_seconds(&r.stretches()[0]), 10 + 60);
        assert_eq!(r.stretch_seconds(&r.stretches()[1]), 10 + 4 * 30 + 3 * 5);
        assert_eq!(r.stretch_seconds(&r.stretches()[2]), 3 + 2 * 60 + 5);
        assert_eq!(r.total_seconds(), 70 + 145 + 128);
    }
}
