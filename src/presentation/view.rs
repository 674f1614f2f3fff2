//! Presentation-agnostic view model built from snapshots

use serde::Serialize;

use crate::{
    routine::{Routine, StretchDefinition},
    state::{Phase, RoutineSnapshot},
};

/// Format seconds as `m:ss`
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Text for each area of a display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayText {
    pub title: String,
    pub phase: String,
    pub timer: String,
    pub remaining: String,
    pub description: String,
}

impl DisplayText {
    pub fn from_snapshot(snapshot: &RoutineSnapshot) -> Self {
        let Some(stretch) = snapshot.stretch.as_ref() else {
            return Self {
                title: "Routine Complete!".to_string(),
                phase: String::new(),
                timer: "--".to_string(),
                remaining: String::new(),
                description: String::new(),
            };
        };

        let remaining = if snapshot.phase.is_active() {
            format!("{} remaining", format_time(snapshot.total_time_remaining))
        } else {
            String::new()
        };

        Self {
            title: stretch.name.clone(),
            phase: phase_text(snapshot),
            timer: snapshot.time_remaining.to_string(),
            remaining,
            description: stretch.description.clone(),
        }
    }
}

fn phase_text(snapshot: &RoutineSnapshot) -> String {
    match snapshot.phase {
        phase if phase.is_preparing() => "Get ready...".to_string(),
        Phase::Hold => {
            let Some(side) = snapshot.side.as_deref() else {
                return "Hold".to_string();
            };
            if snapshot.repetitions > 1 {
                format!("Hold - {} ({}/{})", side, snapshot.repetition + 1, snapshot.repetitions)
            } else {
                format!("Hold - {side}")
            }
        }
        _ => String::new(),
    }
}

/// Where a stretch sits relative to the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryStatus {
    Pending,
    Current,
    Completed,
}

/// One line of the routine overview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    pub name: String,
    pub duration: String,
    pub status: EntryStatus,
}

fn duration_label(stretch: &StretchDefinition) -> String {
    let holds = stretch.hold_count();
    if holds > 1 {
        format!("{}s × {}", stretch.duration_seconds(), holds)
    } else {
        format!("{}s", stretch.duration_seconds())
    }
}

/// Overview of the whole routine with per-stretch status
pub fn routine_list(routine: &Routine, snapshot: &RoutineSnapshot) -> Vec<ListEntry> {
    routine
        .stretches()
        .iter()
        .enumerate()
        .map(|(index, stretch)| {
            let status = if index == snapshot.stretch_index && snapshot.phase.is_active() {
                EntryStatus::Current
            } else if index < snapshot.stretch_index {
                EntryStatus::Completed
            } else {
                EntryStatus::Pending
            };
            ListEntry {
                name: stretch.name().to_string(),
                duration: duration_label(stretch),
                status,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        routine::{PhaseTiming, SideKind, StretchConfig},
        state::{ManualClock, RoutineRunner},
    };

    fn runner() -> (RoutineRunner<ManualClock>, ManualClock) {
        let routine = Routine::new(
            vec![
                StretchConfig::new("twist", "Supine Spinal Twist", 60)
                    .with_sides(SideKind::LeftRight),
                StretchConfig::new("cat-cow", "Cat/Cow", 30)
                    .with_side_names(&["Cat", "Cow"])
                    .with_repetitions(2),
                StretchConfig::new("plank", "Plank", 60),
            ],
            PhaseTiming::default(),
        )
        .unwrap();
        let clock = ManualClock::new();
        (RoutineRunner::with_clock(routine, clock.clone()), clock)
    }

    fn ticks(runner: &mut RoutineRunner<ManualClock>, clock: &ManualClock, n: u32) {
        for _ in 0..n {
            clock.advance(Duration::from_secs(1));
            runner.advance_one_second();
        }
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(59), "0:59");
        assert_eq!(format_time(61), "1:01");
        assert_eq!(format_time(1105), "18:25");
    }

    #[test]
    fn phase_text_follows_runner() {
        let (mut runner, clock) = runner();
        runner.start().unwrap();
        let text = DisplayText::from_snapshot(&runner.snapshot());
        assert_eq!(text.title, "Supine Spinal Twist");
        assert_eq!(text.phase, "Get ready...");
        assert_eq!(text.timer, "10");
        assert_eq!(text.remaining, format!("{} remaining", format_time(135 + 145 + 70)));

        ticks(&mut runner, &clock, 10);
        assert_eq!(DisplayText::from_snapshot(&runner.snapshot()).phase, "Hold - Left");

        // Through the twist and into the first Cat hold
        ticks(&mut runner, &clock, 60 + 5 + 60 + 10);
        assert_eq!(DisplayText::from_snapshot(&runner.snapshot()).phase, "Hold - Cat (1/2)");
    }

    #[test]
    fn complete_routine_has_terminal_text() {
        let (mut runner, clock) = runner();
        runner.start().unwrap();
        ticks(&mut runner, &clock, 135 + 145 + 70);
        assert!(runner.is_complete());

        let text = DisplayText::from_snapshot(&runner.snapshot());
        assert_eq!(text.title, "Routine Complete!");
        assert_eq!(text.timer, "--");
        assert!(text.phase.is_empty());
    }

    #[test]
    fn routine_list_marks_progress() {
        let (mut runner, clock) = runner();
        let idle = routine_list(runner.routine(), &runner.snapshot());
        assert!(idle.iter().all(|e| e.status == EntryStatus::Pending));
        assert_eq!(idle[0].duration, "60s × 2");
        assert_eq!(idle[1].duration, "30s × 4");
        assert_eq!(idle[2].duration, "60s");

        runner.start().unwrap();
        ticks(&mut runner, &clock, 135);
        let statuses: Vec<_> = routine_list(runner.routine(), &runner.snapshot())
            .into_iter()
            .map(|e| e.status)
            .collect();
        assert_eq!(
            statuses,
            vec![EntryStatus::Completed, EntryStatus::Current, EntryStatus::Pending]
        );
    }
}
