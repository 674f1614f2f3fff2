//! Wall-clock sources and phase progress interpolation

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

/// Source of "now" for progress interpolation and pause bookkeeping
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// The real monotonic clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Phase-start reference used to draw a continuous progress bar.
///
/// Reading it never touches runner state, so a redraw loop can hold a copy
/// and query it as often as it likes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseClock {
    pub started_at: Instant,
    pub paused_at: Option<Instant>,
    pub total_seconds: u32,
}

impl PhaseClock {
    pub fn new(started_at: Instant, total_seconds: u32) -> Self {
        Self {
            started_at,
            paused_at: None,
            total_seconds,
        }
    }

    /// Time spent in the phase; frozen at the pause instant while paused
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        self.paused_at
            .unwrap_or(now)
            .saturating_duration_since(self.started_at)
    }

    /// Elapsed fraction of the phase in `[0, 1]`
    pub fn progress_at(&self, now: Instant) -> f64 {
        if self.total_seconds == 0 {
            return 0.0;
        }
        let fraction = self.elapsed_at(now).as_secs_f64() / f64::from(self.total_seconds);
        fraction.min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        let before = clock.now();
        other.advance(Duration::from_secs(3));
        assert_eq!(clock.now() - before, Duration::from_secs(3));
    }

    #[test]
    fn progress_is_clamped_and_freezes_while_paused() {
        let start = Instant::now();
        let mut phase = PhaseClock::new(start, 10);

        assert_eq!(phase.progress_at(start), 0.0);
        assert!((phase.progress_at(start + Duration::from_secs(5)) - 0.5).abs() < 1e-9);
        assert_eq!(phase.progress_at(start + Duration::from_secs(30)), 1.0);

        phase.paused_at = Some(start + Duration::from_secs(2));
        assert!((phase.progress_at(start + Duration::from_secs(9)) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn zero_length_phase_has_no_progress() {
        let start = Instant::now();
        assert_eq!(PhaseClock::new(start, 0).progress_at(start + Duration::from_secs(1)), 0.0);
    }
}
