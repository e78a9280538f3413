//! WolfJournal Error Types

use thiserror::Error;

/// Result type alias for WolfJournal operations
pub type Result<T> = std::result::Result<T, Error>;

/// WolfJournal error types
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Configuration serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    // Lifecycle errors
    #[error("Invalid journal state: {0}")]
    InvalidState(String),

    #[error("Unrecognized journal role: {0}")]
    UnrecognizedRole(String),

    #[error("Invalid control command: {0}")]
    Command(String),

    #[error("Journal system is already running")]
    AlreadyRunning,

    // Journal errors (raised by concrete journals from their hooks)
    #[error("Journal error: {0}")]
    Journal(String),

    #[error("Journal is not primary, local appends are closed")]
    NotPrimary,

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Internal errors
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Shutdown in progress")]
    ShuttingDown,
}

impl Error {
    /// Check if this error is retryable by the control plane
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::Journal(_) | Error::Cancelled
        )
    }

    /// Check if this error is a lifecycle precondition violation
    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::InvalidState(_) | Error::AlreadyRunning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(Error::Cancelled.is_retryable());
        assert!(Error::Journal("peer unreachable".into()).is_retryable());
        assert!(!Error::InvalidState("stopped".into()).is_retryable());

        assert!(Error::AlreadyRunning.is_precondition());
        assert!(Error::InvalidState("stopped".into()).is_precondition());
        assert!(!Error::NotPrimary.is_precondition());
        assert!(!Error::Command("elect".into()).is_retryable());
    }
}
