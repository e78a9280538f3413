//! Journal Roles
//!
//! The closed role set a journal can hold, plus the derived lifecycle
//! state exposed to readers.

use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Role of a journal in the replicated log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum JournalRole {
    /// Accepts and durably appends new entries locally
    Primary = 1,
    /// Follows and replays entries produced by the primary
    #[default]
    Secondary = 2,
}

impl JournalRole {
    /// Encoded form stored in the guard's atomic cell
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether this role accepts local appends
    pub fn is_primary(self) -> bool {
        matches!(self, JournalRole::Primary)
    }
}

impl std::fmt::Display for JournalRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JournalRole::Primary => write!(f, "PRIMARY"),
            JournalRole::Secondary => write!(f, "SECONDARY"),
        }
    }
}

impl TryFrom<u8> for JournalRole {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(JournalRole::Primary),
            2 => Ok(JournalRole::Secondary),
            other => Err(Error::UnrecognizedRole(format!("raw value {}", other))),
        }
    }
}

impl FromStr for JournalRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" => Ok(JournalRole::Primary),
            "secondary" => Ok(JournalRole::Secondary),
            _ => Err(Error::UnrecognizedRole(s.to_string())),
        }
    }
}

/// Externally visible lifecycle state, derived from the running flag and role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JournalState {
    /// Not running; role changes are rejected
    Stopped,
    /// Running and following the primary
    RunningSecondary,
    /// Running and accepting local appends
    RunningPrimary,
}

impl JournalState {
    /// State for a running flag and committed role
    pub fn from_parts(running: bool, role: JournalRole) -> Self {
        match (running, role) {
            (false, _) => JournalState::Stopped,
            (true, JournalRole::Secondary) => JournalState::RunningSecondary,
            (true, JournalRole::Primary) => JournalState::RunningPrimary,
        }
    }

    /// Whether this state is one of the running states
    pub fn is_running(self) -> bool {
        !matches!(self, JournalState::Stopped)
    }
}

impl std::fmt::Display for JournalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JournalState::Stopped => write!(f, "STOPPED"),
            JournalState::RunningSecondary => write!(f, "RUNNING_SECONDARY"),
            JournalState::RunningPrimary => write!(f, "RUNNING_PRIMARY"),
        }
    }
}
