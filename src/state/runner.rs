//! Routine runner: the phase state machine walking a routine tick by tick

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::{
    clock::{Clock, PhaseClock, SystemClock},
    snapshot::{RoutineSnapshot, StretchSummary},
    Phase, RunnerEvent,
};
use crate::{
    error::RoutineError,
    routine::{Routine, StretchDefinition},
};

/// Drives a user through a routine one second at a time.
///
/// Every mutator returns the events it produced, in order. The runner never
/// performs side effects itself; sounds and redraws belong to whoever reads
/// those events.
#[derive(Debug)]
pub struct RoutineRunner<C: Clock = SystemClock> {
    routine: Routine,
    clock: C,
    current_index: usize,
    phase: Phase,
    current_side_index: usize,
    current_repetition: u32,
    time_remaining: u32,
    total_time: u32,
    phase_clock: PhaseClock,
}

impl RoutineRunner<SystemClock> {
    pub fn new(routine: Routine) -> Self {
        Self::with_clock(routine, SystemClock)
    }
}

impl<C: Clock> RoutineRunner<C> {
    pub fn with_clock(routine: Routine, clock: C) -> Self {
        let now = clock.now();
        Self {
            routine,
            clock,
            current_index: 0,
            phase: Phase::Idle,
            current_side_index: 0,
            current_repetition: 0,
            time_remaining: 0,
            total_time: 0,
            phase_clock: PhaseClock::new(now, 0),
        }
    }

    pub fn routine(&self) -> &Routine {
        &self.routine
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_side_index(&self) -> usize {
        self.current_side_index
    }

    pub fn current_repetition(&self) -> u32 {
        self.current_repetition
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn total_time(&self) -> u32 {
        self.total_time
    }

    pub fn is_paused(&self) -> bool {
        self.phase_clock.paused_at.is_some()
    }

    /// Idle because the last stretch finished, not because it never ran
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Idle
            && !self.routine.is_empty()
            && self.current_index >= self.routine.len()
    }

    pub fn phase_started_at(&self) -> Instant {
        self.phase_clock.started_at
    }

    pub fn current_stretch(&self) -> Option<&StretchDefinition> {
        self.routine.get(self.current_index)
    }

    /// Side label, only while holding or switching sides
    pub fn current_side(&self) -> Option<String> {
        if !matches!(self.phase, Phase::Hold | Phase::SideTransition) {
            return None;
        }
        self.current_stretch()
            .and_then(|s| s.side_names().get(self.current_side_index))
            .cloned()
    }

    /// Begin (or restart) the routine at the first stretch's transition
    pub fn start(&mut self) -> Result<Vec<RunnerEvent>, RoutineError> {
        if self.routine.is_empty() {
            warn!("Refusing to start an empty routine");
            return Err(RoutineError::EmptyRoutine);
        }

        self.reset_position();
        let mut events = vec![RunnerEvent::Started {
            stretch_count: self.routine.len(),
        }];
        self.enter_transition(&mut events);

        info!(
            "Routine started: {} stretches, {}s total",
            self.routine.len(),
            self.total_time_remaining()
        );
        Ok(events)
    }

    /// Halt and return to idle. Safe in any phase.
    pub fn stop(&mut self) -> Vec<RunnerEvent> {
        let was_active = self.phase.is_active();
        self.reset_position();
        self.enter_idle();

        if was_active {
            info!("Routine stopped");
            vec![RunnerEvent::Stopped]
        } else {
            Vec::new()
        }
    }

    /// Freeze the countdown. No-op when idle or already paused.
    pub fn pause(&mut self) -> Vec<RunnerEvent> {
        if !self.phase.is_active() || self.is_paused() {
            return Vec::new();
        }
        self.phase_clock.paused_at = Some(self.clock.now());
        info!("Routine paused with {}s left in {}", self.time_remaining, self.phase);
        vec![RunnerEvent::Paused]
    }

    /// Continue after a pause, shifting the phase start by the paused time
    pub fn resume(&mut self) -> Vec<RunnerEvent> {
        let Some(paused_at) = self.phase_clock.paused_at.take() else {
            return Vec::new();
        };
        let paused_for = self.clock.now().saturating_duration_since(paused_at);
        self.phase_clock.started_at += paused_for;

        info!("Routine resumed after {:?}", paused_for);
        vec![RunnerEvent::Resumed {
            paused_for_ms: u64::try_from(paused_for.as_millis()).unwrap_or(u64::MAX),
        }]
    }

    pub fn toggle_pause(&mut self) -> Vec<RunnerEvent> {
        if self.is_paused() {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// One tick of the countdown. At zero, performs exactly one phase change.
    pub fn advance_one_second(&mut self) -> Vec<RunnerEvent> {
        if !self.phase.is_active() || self.is_paused() {
            return Vec::new();
        }

        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining > 0 {
            return Vec::new();
        }

        let mut events = Vec::new();
        self.advance_phase(&mut events);
        events
    }

    /// Seconds until the routine completes if nobody pauses.
    ///
    /// Counts the rest of the current phase, the holds and side transitions
    /// still ahead in this stretch, and every later stretch in full.
    pub fn total_time_remaining(&self) -> u64 {
        if !self.phase.is_active() {
            return 0;
        }
        let Some(stretch) = self.current_stretch() else {
            return 0;
        };

        let side_transition = u64::from(self.routine.timing().side_transition_seconds);
        let duration = u64::from(stretch.duration_seconds());
        let holds = u64::from(stretch.hold_count());
        let position = u64::from(self.current_repetition) * u64::from(stretch.side_count())
            + self.current_side_index as u64;
        let holds_after = holds.saturating_sub(position + 1);

        let rest_of_stretch = match self.phase {
            Phase::Transition => holds * duration + (holds - 1) * side_transition,
            Phase::SideTransition => duration + holds_after * (duration + side_transition),
            Phase::Hold => holds_after * (duration + side_transition),
            Phase::Idle => 0,
        };

        let later: u64 = self.routine.stretches()[self.current_index + 1..]
            .iter()
            .map(|s| self.routine.stretch_seconds(s))
            .sum();

        u64::from(self.time_remaining) + rest_of_stretch + later
    }

    /// Elapsed fraction of the current phase, for a progress bar
    pub fn progress(&self) -> f64 {
        self.phase_clock.progress_at(self.clock.now())
    }

    pub fn snapshot(&self) -> RoutineSnapshot {
        let stretch = self.current_stretch();
        RoutineSnapshot {
            phase: self.phase,
            stretch_index: self.current_index,
            stretch_count: self.routine.len(),
            stretch: stretch.map(StretchSummary::from),
            side: self.current_side(),
            repetition: self.current_repetition,
            repetitions: stretch.map_or(1, |s| s.repetitions()),
            time_remaining: self.time_remaining,
            total_time: self.total_time,
            total_time_remaining: self.total_time_remaining(),
            progress: self.progress(),
            paused: self.is_paused(),
            complete: self.is_complete(),
            captured_at: Utc::now(),
            clock: self.phase_clock,
        }
    }

    fn advance_phase(&mut self, events: &mut Vec<RunnerEvent>) {
        let Some(stretch) = self.current_stretch() else {
            self.enter_idle();
            return;
        };
        let side_count = stretch.side_names().len();
        let repetitions = stretch.repetitions();
        let duration = stretch.duration_seconds();

        match self.phase {
            Phase::Transition => {
                self.current_side_index = 0;
                self.current_repetition = 0;
                self.enter(Phase::Hold, duration, events);
            }
            Phase::SideTransition => self.enter(Phase::Hold, duration, events),
            Phase::Hold => {
                if self.current_side_index + 1 < side_count {
                    self.current_side_index += 1;
                    self.change_side(events);
                } else if self.current_repetition + 1 < repetitions {
                    self.current_repetition += 1;
                    self.current_side_index = 0;
                    self.change_side(events);
                } else {
                    self.next_stretch(events);
                }
            }
            Phase::Idle => {}
        }
    }

    fn change_side(&mut self, events: &mut Vec<RunnerEvent>) {
        // Report the side the upcoming hold will use
        let side = self
            .current_stretch()
            .and_then(|s| s.side_names().get(self.current_side_index))
            .cloned();
        debug!(
            "Stretch {} moving to side {:?}, repetition {}",
            self.current_index,
            side,
            self.current_repetition + 1
        );
        events.push(RunnerEvent::SideChanged {
            stretch_index: self.current_index,
            side,
            repetition: self.current_repetition,
        });
        let side_transition = self.routine.timing().side_transition_seconds;
        self.enter(Phase::SideTransition, side_transition, events);
    }

    fn next_stretch(&mut self, events: &mut Vec<RunnerEvent>) {
        events.push(RunnerEvent::StretchCompleted {
            stretch_index: self.current_index,
        });
        self.current_index += 1;
        self.current_side_index = 0;
        self.current_repetition = 0;

        if self.current_index < self.routine.len() {
            self.enter_transition(events);
        } else {
            self.enter_idle();
            info!("Routine complete");
            events.push(RunnerEvent::RoutineCompleted);
        }
    }

    fn enter_transition(&mut self, events: &mut Vec<RunnerEvent>) {
        let seconds = self
            .current_stretch()
            .map_or(self.routine.timing().transition_seconds, |s| self.routine.transition_for(s));
        self.enter(Phase::Transition, seconds, events);
    }

    fn enter(&mut self, phase: Phase, seconds: u32, events: &mut Vec<RunnerEvent>) {
        self.phase = phase;
        self.total_time = seconds;
        self.time_remaining = seconds;
        self.phase_clock = PhaseClock::new(self.clock.now(), seconds);
        debug!("Entered {} for stretch {} ({}s)", phase, self.current_index, seconds);
        events.push(RunnerEvent::PhaseEntered {
            phase,
            stretch_index: self.current_index,
            duration: seconds,
        });
    }

    fn enter_idle(&mut self) {
        self.phase = Phase::Idle;
        self.total_time = 0;
        self.time_remaining = 0;
        self.phase_clock = PhaseClock::new(self.clock.now(), 0);
    }

    fn reset_position(&mut self) {
        self.current_index = 0;
        self.current_side_index = 0;
        self.current_repetition = 0;
    }
}
