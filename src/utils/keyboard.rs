//! Keyboard controls read from stdin

use std::io::BufRead;

use tracing::{debug, info};

use crate::tasks::{Command, SessionControls};

/// Map one line of input to a session command
pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "p" | "pause" => Some(Command::TogglePause),
        "r" | "resume" => Some(Command::Resume),
        "q" | "quit" | "s" | "stop" => Some(Command::Stop),
        _ => None,
    }
}

/// Read commands from stdin on a plain thread.
///
/// Blocking stdin reads would keep the runtime from shutting down, so this
/// runs outside it and is simply abandoned when the process exits.
pub fn spawn_keyboard_reader(controls: SessionControls) {
    std::thread::spawn(move || {
        info!("Keyboard controls: Enter/p = pause or resume, q = stop");
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let Some(command) = parse_command(&line) else {
                debug!("Ignoring input {:?}", line);
                continue;
            };
            if !controls.blocking_send(command) || command == Command::Stop {
                break;
            }
        }
        debug!("Keyboard reader finished");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command(""), Some(Command::TogglePause));
        assert_eq!(parse_command(" P "), Some(Command::TogglePause));
        assert_eq!(parse_command("resume"), Some(Command::Resume));
        assert_eq!(parse_command("q"), Some(Command::Stop));
        assert_eq!(parse_command("dance"), None);
    }
}
