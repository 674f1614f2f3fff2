//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::{
    presentation::OutputMode,
    routine::{PhaseTiming, DEFAULT_SIDE_TRANSITION_SECONDS, DEFAULT_TRANSITION_SECONDS},
    tasks::SessionOptions,
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "stretch-timer")]
#[command(about = "A guided stretching-routine timer")]
#[command(version)]
pub struct Config {
    /// Routine file (JSON); the built-in routine is used when omitted
    #[arg(short, long)]
    pub routine: Option<PathBuf>,

    /// Seconds to get ready before each stretch
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_TRANSITION_SECONDS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub transition: u32,

    /// Seconds to switch between sides and repetitions
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_SIDE_TRANSITION_SECONDS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub side_transition: u32,

    /// Progress bar refresh interval in milliseconds
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u64).range(10..=1000))]
    pub refresh_ms: u64,

    /// Print events and snapshots as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Do not ring the terminal bell
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the routine and exit
    #[arg(short, long)]
    pub list: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Routine-wide transition durations
    pub fn timing(&self) -> PhaseTiming {
        PhaseTiming {
            transition_seconds: self.transition,
            side_transition_seconds: self.side_transition,
        }
    }

    /// Tick rates for the session
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            progress_period: Duration::from_millis(self.refresh_ms),
            ..SessionOptions::default()
        }
    }

    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
