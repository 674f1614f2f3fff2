//! Terminal rendering of a running session

use std::io::{self, Write};

use tokio::sync::{
    broadcast::{self, error::RecvError},
    watch,
};
use tracing::{debug, info, warn};

use super::view::DisplayText;
use crate::state::{Phase, RoutineSnapshot, RunnerEvent};

const BAR_WIDTH: usize = 20;

/// How the session is written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Header per stretch and a redrawn status line
    #[default]
    Human,
    /// One JSON object per event and per snapshot
    Json,
}

/// Progress bar of `BAR_WIDTH` cells
pub fn progress_bar(fraction: f64) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// Single status line for the current phase
pub fn status_line(snapshot: &RoutineSnapshot, progress: f64) -> String {
    let text = DisplayText::from_snapshot(snapshot);
    let mut line = format!(
        "{} {:>3}s  {}  ({})",
        progress_bar(progress),
        snapshot.time_remaining,
        text.phase,
        text.remaining
    );
    if snapshot.paused {
        line.push_str("  [paused]");
    }
    line
}

/// Writes session output to any writer
pub struct TerminalRenderer<W: Write> {
    out: W,
    mode: OutputMode,
    line_open: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, mode: OutputMode) -> Self {
        Self {
            out,
            mode,
            line_open: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// React to a runner event, given the snapshot taken right after it
    pub fn on_event(&mut self, event: &RunnerEvent, snapshot: &RoutineSnapshot) -> io::Result<()> {
        match self.mode {
            OutputMode::Json => {
                serde_json::to_writer(&mut self.out, event)?;
                writeln!(self.out)?;
            }
            OutputMode::Human => match event {
                RunnerEvent::PhaseEntered {
                    phase: Phase::Transition,
                    stretch_index,
                    ..
                } => {
                    if let Some(stretch) = snapshot.stretch.as_ref() {
                        self.close_line()?;
                        writeln!(
                            self.out,
                            "\n({}/{}) {}",
                            stretch_index + 1,
                            snapshot.stretch_count,
                            stretch.name
                        )?;
                        if !stretch.description.is_empty() {
                            writeln!(self.out, "    {}", stretch.description)?;
                        }
                        if !stretch.target_areas.is_empty() {
                            writeln!(self.out, "    Targets: {}", stretch.target_areas.join(", "))?;
                        }
                    }
                }
                RunnerEvent::RoutineCompleted => {
                    self.close_line()?;
                    writeln!(self.out, "\nRoutine Complete!")?;
                }
                RunnerEvent::Stopped => {
                    self.close_line()?;
                    writeln!(self.out, "Stopped.")?;
                }
                _ => {}
            },
        }
        self.out.flush()
    }

    /// Redraw for a new snapshot or progress value
    pub fn on_update(&mut self, snapshot: &RoutineSnapshot, progress: f64) -> io::Result<()> {
        match self.mode {
            OutputMode::Json => {
                serde_json::to_writer(&mut self.out, snapshot)?;
                writeln!(self.out)?;
            }
            OutputMode::Human => {
                if !snapshot.phase.is_active() {
                    return Ok(());
                }
                // Clear to end of line so shorter text leaves no residue
                write!(self.out, "\r{}\x1b[K", status_line(snapshot, progress))?;
                self.line_open = true;
            }
        }
        self.out.flush()
    }

    fn close_line(&mut self) -> io::Result<()> {
        if self.line_open {
            writeln!(self.out)?;
            self.line_open = false;
        }
        Ok(())
    }

    pub fn finish(&mut self) -> io::Result<()> {
        self.close_line()?;
        self.out.flush()
    }
}

/// Background task drawing the session until its snapshot channel closes
pub async fn render_task(
    mut events: broadcast::Receiver<RunnerEvent>,
    mut snapshots: watch::Receiver<RoutineSnapshot>,
    mut progress: watch::Receiver<f64>,
    mode: OutputMode,
) {
    info!("Starting render task");
    let mut renderer = TerminalRenderer::new(io::stdout(), mode);
    let mut progress_open = true;

    loop {
        let result = tokio::select! {
            biased;

            event = events.recv() => match event {
                Ok(event) => {
                    let snapshot = snapshots.borrow().clone();
                    renderer.on_event(&event, &snapshot)
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Renderer fell behind, skipped {} events", skipped);
                    Ok(())
                }
                Err(RecvError::Closed) => break,
            },

            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                let fraction = *progress.borrow();
                // JSON consumers only get per-second snapshots
                renderer.on_update(&snapshot, fraction)
            }

            changed = progress.changed(), if progress_open && mode == OutputMode::Human => {
                if changed.is_err() {
                    progress_open = false;
                    continue;
                }
                let fraction = *progress.borrow_and_update();
                let snapshot = snapshots.borrow().clone();
                renderer.on_update(&snapshot, fraction)
            }
        };

        if let Err(e) = result {
            warn!("Failed to write to terminal: {}", e);
            break;
        }
    }

    // Events published together with the final snapshot
    while let Ok(event) = events.try_recv() {
        let snapshot = snapshots.borrow().clone();
        if let Err(e) = renderer.on_event(&event, &snapshot) {
            debug!("Failed to write final event: {}", e);
            break;
        }
    }
    if let Err(e) = renderer.finish() {
        debug!("Failed to flush terminal: {}", e);
    }
    debug!("Render task finished");
}
