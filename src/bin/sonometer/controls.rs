//! Line-based keyboard controls read from stdin on a dedicated thread.

use crossbeam_channel::Sender;
use sonometer::log_debug;
use std::io::{self, BufRead};
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    Start,
    Pause,
    Reset,
    Quit,
}

pub(crate) const CONTROLS_HELP: &str = "Controls: s=start  p=pause  r=reset  q=quit (then Enter)";

pub(crate) fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "s" | "start" | "resume" => Some(Command::Start),
        "p" | "pause" => Some(Command::Pause),
        "r" | "reset" => Some(Command::Reset),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

/// Forward parsed commands until stdin closes or the receiver goes away.
pub(crate) fn spawn_control_thread(tx: Sender<Command>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    log_debug(&format!("stdin read error: {err}"));
                    break;
                }
            };
            let Some(command) = parse_command(&line) else {
                if !line.trim().is_empty() {
                    log_debug(&format!("ignoring unknown command {:?}", line.trim()));
                }
                continue;
            };
            if tx.send(command).is_err() {
                return;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_forms() {
        assert_eq!(parse_command("s"), Some(Command::Start));
        assert_eq!(parse_command(" Resume\n"), Some(Command::Start));
        assert_eq!(parse_command("P"), Some(Command::Pause));
        assert_eq!(parse_command("reset"), Some(Command::Reset));
        assert_eq!(parse_command("exit"), Some(Command::Quit));
    }

    #[test]
    fn ignores_unknown_input() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("louder"), None);
    }
}
