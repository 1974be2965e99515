//! Operator commands typed on stdin.

use std::{
    io::{self, BufRead},
    str::FromStr,
    thread,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Lines buffered between the input thread and the tick loop.
const COMMAND_BACKLOG: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Arm the target `delta` Hz below the latest reading (above if negative).
    Start(f64),
    Clear,
    Exit,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?} (expected start <delta>, clear or exit)")]
    Unknown(String),
    #[error("start needs a frequency offset in Hz")]
    MissingDelta,
    #[error("invalid frequency offset {0:?}")]
    BadDelta(String),
    #[error("unexpected argument {0:?}")]
    ExtraArgument(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().ok_or(CommandError::Empty)?.to_ascii_lowercase();
        let cmd = match verb.as_str() {
            "start" | "s" => {
                let raw = parts.next().ok_or(CommandError::MissingDelta)?;
                let delta = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| CommandError::BadDelta(raw.to_string()))?;
                Command::Start(delta)
            }
            "clear" | "c" => Command::Clear,
            "exit" | "quit" | "q" => Command::Exit,
            _ => return Err(CommandError::Unknown(verb)),
        };
        if let Some(extra) = parts.next() {
            return Err(CommandError::ExtraArgument(extra.to_string()));
        }
        Ok(cmd)
    }
}

/// Forwards lines from `input` on a dedicated thread. The thread is detached:
/// a read still blocked at exit does not keep the process alive, and it ends on
/// EOF or once the receiver is gone.
pub fn spawn_line_reader<R>(input: R) -> io::Result<mpsc::Receiver<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(COMMAND_BACKLOG);
    thread::Builder::new()
        .name("operator-input".into())
        .spawn(move || {
            for line in input.lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!("reading commands failed: {err}");
                        break;
                    }
                }
            }
            debug!("operator input thread finished");
        })?;
    Ok(rx)
}

/// Operator commands from the terminal.
pub fn stdin_commands() -> io::Result<mpsc::Receiver<String>> {
    spawn_line_reader(io::BufReader::new(io::stdin()))
}
