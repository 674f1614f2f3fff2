//! Audio cue policy and playback
//!
//! The runner only reports which event happened. Which tone that becomes,
//! and how it is produced, is decided here.

use std::{io::Write, sync::Arc, time::Duration};

use serde::Serialize;
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
    time::sleep,
};
use tracing::{debug, error, info, warn};

use crate::state::{Phase, RunnerEvent};

/// A single short tone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cue {
    pub frequency_hz: u32,
    pub duration_ms: u64,
}

impl Cue {
    pub const fn tone(frequency_hz: u32) -> Self {
        Self {
            frequency_hz,
            duration_ms: 200,
        }
    }
}

/// A cue played `count` times, `spacing` apart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CuePattern {
    pub cue: Cue,
    pub count: u32,
    pub spacing: Duration,
}

impl CuePattern {
    pub fn single(cue: Cue) -> Self {
        Self {
            cue,
            count: 1,
            spacing: Duration::ZERO,
        }
    }
}

/// Which tone goes with which event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CuePolicy {
    pub stretch_start: Cue,
    pub hold_start: Cue,
    pub side_change: Cue,
    pub complete: Cue,
    pub complete_count: u32,
    pub complete_spacing: Duration,
}

impl Default for CuePolicy {
    fn default() -> Self {
        Self {
            stretch_start: Cue::tone(1000),
            hold_start: Cue::tone(800),
            side_change: Cue::tone(600),
            complete: Cue::tone(1000),
            complete_count: 3,
            complete_spacing: Duration::from_millis(200),
        }
    }
}

impl CuePolicy {
    pub fn pattern_for(&self, event: &RunnerEvent) -> Option<CuePattern> {
        match event {
            RunnerEvent::PhaseEntered {
                phase: Phase::Transition,
                ..
            } => Some(CuePattern::single(self.stretch_start)),
            RunnerEvent::PhaseEntered {
                phase: Phase::Hold,
                ..
            } => Some(CuePattern::single(self.hold_start)),
            RunnerEvent::SideChanged { .. } => Some(CuePattern::single(self.side_change)),
            RunnerEvent::RoutineCompleted => Some(CuePattern {
                cue: self.complete,
                count: self.complete_count,
                spacing: self.complete_spacing,
            }),
            _ => None,
        }
    }
}

/// Something that can make a noise
pub trait CueSink: Send + Sync + 'static {
    fn play(&self, cue: Cue);
}

/// Rings the terminal bell; a terminal has no notion of pitch
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl CueSink for TerminalBell {
    fn play(&self, cue: Cue) {
        debug!("Cue {}Hz for {}ms", cue.frequency_hz, cue.duration_ms);
        let mut err = std::io::stderr().lock();
        if let Err(e) = err.write_all(b"\x07").and_then(|_| err.flush()) {
            debug!("Failed to ring terminal bell: {}", e);
        }
    }
}

/// Logs cues without sound, for `--quiet`
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl CueSink for SilentSink {
    fn play(&self, cue: Cue) {
        debug!("Silent cue {}Hz", cue.frequency_hz);
    }
}

/// Play every repetition of a pattern
pub async fn play_pattern(sink: Arc<dyn CueSink>, pattern: CuePattern) {
    for i in 0..pattern.count {
        if i > 0 {
            sleep(pattern.spacing).await;
        }
        sink.play(pattern.cue);
    }
}

/// Background task turning runner events into cues.
///
/// Multi-cue patterns run as their own one-shot tasks so the event stream
/// is never held up; they are awaited before this task returns.
pub async fn cue_task(
    mut events: broadcast::Receiver<RunnerEvent>,
    sink: Arc<dyn CueSink>,
    policy: CuePolicy,
) {
    info!("Starting cue task");
    let mut pending: Vec<JoinHandle<()>> = Vec::new();

    loop {
        match events.recv().await {
            Ok(event) => {
                let Some(pattern) = policy.pattern_for(&event) else {
                    continue;
                };
                if pattern.count <= 1 {
                    sink.play(pattern.cue);
                } else {
                    pending.retain(|handle| !handle.is_finished());
                    pending.push(tokio::spawn(play_pattern(Arc::clone(&sink), pattern)));
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Cue task fell behind, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }

    for handle in pending {
        if let Err(e) = handle.await {
            error!("Cue pattern task failed: {}", e);
        }
    }
    debug!("Cue task finished");
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio::time::Instant;

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        played: Mutex<Vec<(Instant, Cue)>>,
    }

    impl CueSink for RecordingSink {
        fn play(&self, cue: Cue) {
            self.played.lock().unwrap().push((Instant::now(), cue));
        }
    }

    fn entered(phase: Phase) -> RunnerEvent {
        RunnerEvent::PhaseEntered {
            phase,
            stretch_index: 0,
            duration: 10,
        }
    }

    #[test]
    fn policy_distinguishes_events() {
        let policy = CuePolicy::default();
        assert_eq!(
            policy.pattern_for(&entered(Phase::Transition)).unwrap().cue.frequency_hz,
            1000
        );
        assert_eq!(policy.pattern_for(&entered(Phase::Hold)).unwrap().cue.frequency_hz, 800);
        let side = RunnerEvent::SideChanged {
            stretch_index: 0,
            side: Some("Right".to_string()),
            repetition: 0,
        };
        assert_eq!(policy.pattern_for(&side).unwrap().cue.frequency_hz, 600);
        assert!(policy.pattern_for(&entered(Phase::SideTransition)).is_none());
        assert!(policy.pattern_for(&RunnerEvent::Paused).is_none());
        assert!(policy.pattern_for(&RunnerEvent::Stopped).is_none());

        let complete = policy.pattern_for(&RunnerEvent::RoutineCompleted).unwrap();
        assert_eq!(complete.count, 3);
        assert_eq!(complete.spacing, Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn completion_plays_three_spaced_cues() {
        let sink = Arc::new(RecordingSink::default());
        let (tx, rx) = broadcast::channel(8);
        let task = tokio::spawn(cue_task(rx, sink.clone(), CuePolicy::default()));

        let started = Instant::now();
        tx.send(RunnerEvent::StretchCompleted { stretch_index: 0 }).unwrap();
        tx.send(RunnerEvent::RoutineCompleted).unwrap();
        drop(tx);
        task.await.unwrap();

        let played = sink.played.lock().unwrap();
        assert_eq!(played.len(), 3);
        assert!(played.iter().all(|(_, cue)| cue.frequency_hz == 1000));
        let offsets: Vec<u128> = played.iter().map(|(at, _)| (*at - started).as_millis()).collect();
        assert!(offsets[0] < 5, "{offsets:?}");
        assert!((200..205).contains(&offsets[1]), "{offsets:?}");
        assert!((400..410).contains(&offsets[2]), "{offsets:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn single_cues_play_immediately() {
        let sink = Arc::new(RecordingSink::default());
        let (tx, rx) = broadcast::channel(8);
        let task = tokio::spawn(cue_task(rx, sink.clone(), CuePolicy::default()));

        tx.send(entered(Phase::Transition)).unwrap();
        tx.send(entered(Phase::Hold)).unwrap();
        tx.send(RunnerEvent::Paused).unwrap();
        drop(tx);
        task.await.unwrap();

        let tones: Vec<u32> = sink
            .played
            .lock()
            .unwrap()
            .iter()
            .map(|(_, c)| c.frequency_hz)
            .collect();
        assert_eq!(tones, vec![1000, 800]);
    }
}
