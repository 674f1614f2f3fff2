//! End-to-end session runs on tokio's paused clock.

use std::sync::{Arc, Mutex};

use stretch_timer::{
    presentation::{cue_task, Cue, CuePolicy, CueSink},
    routine::{load_routine, PhaseTiming, Routine, SideKind, StretchConfig},
    state::{Phase, RoutineRunner, RunnerEvent},
    tasks::{Session, SessionOptions, SessionOutcome},
};

#[derive(Default)]
struct Recorder {
    tones: Mutex<Vec<u32>>,
}

impl CueSink for Recorder {
    fn play(&self, cue: Cue) {
        self.tones.lock().unwrap().push(cue.frequency_hz);
    }
}

#[tokio::test(start_paused = true)]
async fn completion_plays_triple_cue_and_leaves_nothing_running() {
    let routine = Routine::new(
        vec![
            StretchConfig::new("lunge", "Low Lunge", 3).with_sides(SideKind::LeftRight),
            StretchConfig::new("plank", "Plank", 2),
        ],
        PhaseTiming {
            transition_seconds: 2,
            side_transition_seconds: 1,
        },
    )
    .unwrap();

    let mut session = Session::new(RoutineRunner::new(routine), SessionOptions::default());
    let recorder = Arc::new(Recorder::default());
    let cues = tokio::spawn(cue_task(session.subscribe(), recorder.clone(), CuePolicy::default()));
    let snapshots = session.snapshots();

    session.start().unwrap();
    assert_eq!(session.join().await, Some(SessionOutcome::Completed));
    drop(session);
    cues.await.unwrap();

    // transition, hold L, side change, hold R, transition, hold, then three completion cues
    assert_eq!(
        *recorder.tones.lock().unwrap(),
        vec![1000, 800, 600, 800, 1000, 800, 1000, 1000, 1000]
    );
    let last = snapshots.borrow().clone();
    assert!(last.complete);
    assert_eq!(last.phase, Phase::Idle);
    assert_eq!(last.total_time_remaining, 0);
}

#[tokio::test(start_paused = true)]
async fn builtin_routine_runs_for_its_computed_length() {
    let routine = load_routine(None, PhaseTiming::default()).unwrap();
    let expected = routine.total_seconds();

    let mut session = Session::new(RoutineRunner::new(routine), SessionOptions::default());
    let mut events = session.subscribe();
    let counter = tokio::spawn(async move {
        let mut completed_stretches = 0;
        while let Ok(event) = events.recv().await {
            match event {
                RunnerEvent::StretchCompleted { .. } => completed_stretches += 1,
                RunnerEvent::RoutineCompleted => return Some(completed_stretches),
                _ => {}
            }
        }
        None
    });
    let started = tokio::time::Instant::now();

    session.start().unwrap();
    assert_eq!(session.join().await, Some(SessionOutcome::Completed));
    assert_eq!(started.elapsed().as_secs(), expected);
    assert_eq!(counter.await.unwrap(), Some(11));
}
