//! Interactive commands read from stdin
//!
//! Two user intents reach the engine: start/stop and configuration change.

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start when stopped, stop when running
    Toggle,
    /// Rebuild the engine with new processing bounds and generation interval
    Reconfigure {
        min_processing_ms: u64,
        max_processing_ms: u64,
        job_creation_interval_ms: u64,
    },
    Help,
    Quit,
}

pub const HELP: &str = concat!(
    "commands: s = start/stop | c <min_ms> <max_ms> <interval_ms> = reconfigure",
    " | h = help | q = quit"
);

/// Parse one input line; blank lines yield `None`
pub fn parse(line: &str) -> Result<Option<Command>> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(None);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "s" | "start" | "stop" | "toggle" => Command::Toggle,
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        "c" | "config" => {
            let values: Vec<u64> = parts
                .map(|p| p.parse::<u64>().with_context(|| format!("not a number: {}", p)))
                .collect::<Result<_>>()?;
            let [min_processing_ms, max_processing_ms, job_creation_interval_ms] = values[..] else {
                bail!("usage: c <min_ms> <max_ms> <interval_ms>");
            };
            Command::Reconfigure {
                min_processing_ms,
                max_processing_ms,
                job_creation_interval_ms,
            }
        }
        other => bail!("unknown command '{}' ({})", other, HELP),
    };

    Ok(Some(command))
}

/// Spawn a stdin reader; the channel closes at EOF
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).is_err() {
                break;
            }
        }
        debug!("stdin closed");
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toggle_and_quit() {
        assert_eq!(parse("s").unwrap(), Some(Command::Toggle));
        assert_eq!(parse("  STOP ").unwrap(), Some(Command::Toggle));
        assert_eq!(parse("q").unwrap(), Some(Command::Quit));
        assert_eq!(parse("help").unwrap(), Some(Command::Help));
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_reconfigure() {
        assert_eq!(
            parse("c 100 3000 750").unwrap(),
            Some(Command::Reconfigure {
                min_processing_ms: 100,
                max_processing_ms: 3000,
                job_creation_interval_ms: 750,
            })
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse("c 100 x 750").unwrap_err().to_string().contains("not a number"));
        assert!(parse("c 100 200").unwrap_err().to_string().contains("usage"));
        assert!(parse("launch").unwrap_err().to_string().contains("unknown command"));
    }
}
