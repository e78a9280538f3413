//! Control Console
//!
//! Line-oriented control commands used by `wolfjournal run`. Each line is
//! parsed into a [`ConsoleCommand`] and applied through the controller,
//! while appends are admitted by reading the journal state directly, the
//! way a request router would.

use std::sync::Arc;
use serde::Serialize;

use crate::controller::ControlHandle;
use crate::error::{Error, Result};
use crate::journal::{JournalRole, JournalStatus, JournalSystem, MemoryJournal};

/// A parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Start,
    Stop,
    SetRole(JournalRole),
    Append(String),
    Status,
    Quit,
}

impl ConsoleCommand {
    /// Parse a console line; blank lines and `#` comments yield `None`
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "start" => ConsoleCommand::Start,
            "stop" => ConsoleCommand::Stop,
            "primary" | "promote" => ConsoleCommand::SetRole(JournalRole::Primary),
            "secondary" | "demote" => ConsoleCommand::SetRole(JournalRole::Secondary),
            "role" => ConsoleCommand::SetRole(rest.parse()?),
            "append" if !rest.is_empty() => ConsoleCommand::Append(rest.to_string()),
            "append" => return Err(Error::Command("append needs a payload".into())),
            "status" => ConsoleCommand::Status,
            "quit" | "exit" => ConsoleCommand::Quit,
            other => return Err(Error::Command(format!("unknown command '{}'", other))),
        };

        Ok(Some(command))
    }
}

/// Outcome of one console command
#[derive(Debug, Serialize)]
pub struct ConsoleReply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
    pub status: JournalStatus,
}

/// Apply a command and report the resulting status
pub async fn execute(
    handle: &ControlHandle,
    system: &Arc<JournalSystem<MemoryJournal>>,
    command: ConsoleCommand,
) -> ConsoleReply {
    let mut sequence = None;

    let result = match command {
        ConsoleCommand::Start => handle.start().await,
        ConsoleCommand::Stop => handle.stop().await,
        ConsoleCommand::SetRole(role) => handle.set_role(role).await,
        ConsoleCommand::Append(payload) => {
            if system.accepts_writes() {
                system.hooks().append(payload).await.map(|seq| {
                    sequence = Some(seq);
                })
            } else {
                Err(Error::NotPrimary)
            }
        }
        ConsoleCommand::Status | ConsoleCommand::Quit => Ok(()),
    };

    ConsoleReply {
        ok: result.is_ok(),
        error: result.err().map(|e| e.to_string()),
        sequence,
        status: system.status(),
    }
}
