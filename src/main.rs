//! Stretch Timer - A guided stretching-routine timer
//!
//! This is the main entry point for the stretch-timer application.

use std::sync::Arc;

use tracing::{error, info};

use stretch_timer::{
    config::Config,
    presentation::{
        cue_task, format_time, render_task, routine_list, CuePolicy, CueSink, SilentSink,
        TerminalBell,
    },
    routine::load_routine,
    state::RoutineRunner,
    tasks::{Session, SessionOutcome},
    utils::{shutdown_signal, spawn_keyboard_reader},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr; stdout belongs to the display
    tracing_subscriber::fmt()
        .with_env_filter(format!("stretch_timer={}", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting stretch-timer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: routine={}, transition={}s, side_transition={}s",
        config
            .routine
            .as_ref()
            .map_or_else(|| "built-in".to_string(), |p| p.display().to_string()),
        config.transition,
        config.side_transition
    );

    let routine = load_routine(config.routine.as_deref(), config.timing())?;

    let runner = RoutineRunner::new(routine);
    if config.list {
        for entry in routine_list(runner.routine(), &runner.snapshot()) {
            println!("{:<24} {}", entry.name, entry.duration);
        }
        println!("Total: {}", format_time(runner.routine().total_seconds()));
        return Ok(());
    }

    let mut session = Session::new(runner, config.session_options());

    let sink: Arc<dyn CueSink> = if config.quiet {
        Arc::new(SilentSink)
    } else {
        Arc::new(TerminalBell)
    };
    let cues = tokio::spawn(cue_task(session.subscribe(), sink, CuePolicy::default()));
    let render = tokio::spawn(render_task(
        session.subscribe(),
        session.snapshots(),
        session.progress(),
        config.output_mode(),
    ));

    session.start()?;

    let controls = session.controls();
    spawn_keyboard_reader(controls.clone());

    let interrupted = tokio::select! {
        _ = session.join() => false,
        result = shutdown_signal() => match result {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to listen for signals: {}", e);
                false
            }
        },
    };
    if interrupted {
        info!("Shutdown signal received, stopping routine");
        controls.stop().await;
    }

    let outcome = session.join().await;
    // Closing the event channel lets the cue task finish pending patterns
    drop(session);
    drop(controls);
    if let Err(e) = cues.await {
        error!("Cue task failed: {}", e);
    }
    if let Err(e) = render.await {
        error!("Render task failed: {}", e);
    }

    match outcome {
        Some(SessionOutcome::Completed) => info!("Routine completed"),
        Some(SessionOutcome::Stopped) => info!("Routine stopped"),
        None => error!("Session ended unexpectedly"),
    }
    Ok(())
}
