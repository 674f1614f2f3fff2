//! Routine session: the single owner of a running routine
//!
//! The runner lives inside one tokio task. Ticks and user commands are
//! applied there and nowhere else; everyone else sees snapshots on a watch
//! channel and events on a broadcast channel.

use std::time::Duration;

use serde::Serialize;
use tokio::{
    sync::{broadcast, mpsc, watch},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use super::progress::progress_task;
use crate::{
    error::RoutineError,
    state::{Clock, RoutineRunner, RoutineSnapshot, RunnerEvent, SystemClock},
};

/// User commands applied by the session task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    TogglePause,
    Stop,
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionOutcome {
    Completed,
    Stopped,
}

/// Tick rates for the two timer sources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Countdown period; one second in real use
    pub tick_period: Duration,
    /// Progress-bar refresh period
    pub progress_period: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(1),
            progress_period: Duration::from_millis(100),
        }
    }
}

/// Cloneable handle for sending commands to a running session
#[derive(Debug, Clone)]
pub struct SessionControls {
    tx: mpsc::Sender<Command>,
}

impl SessionControls {
    /// Send a command; false once the session has finished
    pub async fn send(&self, command: Command) -> bool {
        self.tx.send(command).await.is_ok()
    }

    /// Same as [`send`](Self::send), for use from plain threads
    pub fn blocking_send(&self, command: Command) -> bool {
        self.tx.blocking_send(command).is_ok()
    }

    pub async fn pause(&self) -> bool {
        self.send(Command::Pause).await
    }

    pub async fn resume(&self) -> bool {
        self.send(Command::Resume).await
    }

    pub async fn toggle_pause(&self) -> bool {
        self.send(Command::TogglePause).await
    }

    pub async fn stop(&self) -> bool {
        self.send(Command::Stop).await
    }
}

/// Parts moved into the tasks when the session starts
struct Pending<C: Clock> {
    runner: RoutineRunner<C>,
    commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<RoutineSnapshot>,
    progress: watch::Sender<f64>,
}

/// A routine run driven by a 1-second tick and a progress refresh tick
pub struct Session<C: Clock + Clone = SystemClock> {
    options: SessionOptions,
    pending: Option<Pending<C>>,
    commands_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<RunnerEvent>,
    snapshot_rx: watch::Receiver<RoutineSnapshot>,
    progress_rx: watch::Receiver<f64>,
    runner_handle: Option<JoinHandle<SessionOutcome>>,
    progress_handle: Option<JoinHandle<()>>,
    outcome: Option<SessionOutcome>,
}

impl<C: Clock + Clone> Session<C> {
    /// Wrap a runner; nothing runs until [`start`](Self::start)
    pub fn new(runner: RoutineRunner<C>, options: SessionOptions) -> Self {
        let (commands_tx, commands) = mpsc::channel(16);
        let (events_tx, _) = broadcast::channel(64);
        let (snapshots, snapshot_rx) = watch::channel(runner.snapshot());
        let (progress, progress_rx) = watch::channel(0.0);

        Self {
            options,
            pending: Some(Pending {
                runner,
                commands,
                snapshots,
                progress,
            }),
            commands_tx,
            events_tx,
            snapshot_rx,
            progress_rx,
            runner_handle: None,
            progress_handle: None,
            outcome: None,
        }
    }

    /// Receive runner events. Subscribe before `start` to see the first ones.
    pub fn subscribe(&self) -> broadcast::Receiver<RunnerEvent> {
        self.events_tx.subscribe()
    }

    pub fn snapshots(&self) -> watch::Receiver<RoutineSnapshot> {
        self.snapshot_rx.clone()
    }

    pub fn progress(&self) -> watch::Receiver<f64> {
        self.progress_rx.clone()
    }

    pub fn controls(&self) -> SessionControls {
        SessionControls {
            tx: self.commands_tx.clone(),
        }
    }

    /// Start the routine and spawn both tick sources
    pub fn start(&mut self) -> Result<(), RoutineError> {
        let Some(mut pending) = self.pending.take() else {
            warn!("Session already started");
            return Ok(());
        };

        let events = match pending.runner.start() {
            Ok(events) => events,
            Err(e) => {
                self.pending = Some(pending);
                return Err(e);
            }
        };
        publish(&pending.runner, &pending.snapshots, &self.events_tx, events);

        let clock = pending.runner.clock().clone();
        self.progress_handle = Some(tokio::spawn(progress_task(
            self.snapshot_rx.clone(),
            pending.progress,
            clock,
            self.options.progress_period,
        )));
        self.runner_handle = Some(tokio::spawn(session_task(
            pending.runner,
            pending.commands,
            pending.snapshots,
            self.events_tx.clone(),
            self.options.tick_period,
        )));
        Ok(())
    }

    /// Wait for both tasks to finish. Cancel-safe; may be called again.
    pub async fn join(&mut self) -> Option<SessionOutcome> {
        if let Some(handle) = self.runner_handle.as_mut() {
            match handle.await {
                Ok(outcome) => self.outcome = Some(outcome),
                Err(e) => error!("Session task failed: {}", e),
            }
            self.runner_handle = None;
        }
        if let Some(handle) = self.progress_handle.as_mut() {
            if let Err(e) = handle.await {
                error!("Progress task failed: {}", e);
            }
            self.progress_handle = None;
        }
        self.outcome
    }
}

fn publish<C: Clock>(
    runner: &RoutineRunner<C>,
    snapshots: &watch::Sender<RoutineSnapshot>,
    events_tx: &broadcast::Sender<RunnerEvent>,
    events: Vec<RunnerEvent>,
) {
    snapshots.send_replace(runner.snapshot());
    for event in events {
        if events_tx.send(event).is_err() {
            debug!("No event subscribers");
        }
    }
}

/// Owner task: applies ticks and commands until completion or stop
async fn session_task<C: Clock>(
    mut runner: RoutineRunner<C>,
    mut commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<RoutineSnapshot>,
    events_tx: broadcast::Sender<RunnerEvent>,
    tick_period: Duration,
) -> SessionOutcome {
    info!("Starting routine session task");

    let mut interval = time::interval_at(Instant::now() + tick_period, tick_period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let outcome = loop {
        tokio::select! {
            _ = interval.tick() => {
                let events = runner.advance_one_second();
                publish(&runner, &snapshots, &events_tx, events);
                if runner.is_complete() {
                    break SessionOutcome::Completed;
                }
            }

            command = commands.recv() => {
                let command = command.unwrap_or(Command::Stop);
                debug!("Session received command: {:?}", command);
                let events = match command {
                    Command::Pause => runner.pause(),
                    Command::Resume => runner.resume(),
                    Command::TogglePause => runner.toggle_pause(),
                    Command::Stop => runner.stop(),
                };
                publish(&runner, &snapshots, &events_tx, events);
                if command == Command::Stop {
                    break SessionOutcome::Stopped;
                }
            }
        }
    };

    info!("Routine session finished: {:?}", outcome);
    outcome
}
