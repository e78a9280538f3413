//! WolfJournal Configuration
//!
//! This module provides configuration structures for the journal
//! lifecycle controller and its console.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main WolfJournal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WolfJournalConfig {
    /// Node-specific configuration
    pub node: NodeConfig,

    /// Journal configuration
    #[serde(default)]
    pub journal: JournalConfig,

    /// Controller configuration
    #[serde(default)]
    pub controller: ControllerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Node-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Unique node identifier
    pub id: String,
}

/// Journal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalConfig {
    /// Journal implementation (only "memory" is built in)
    #[serde(default = "default_journal_kind")]
    pub kind: String,

    /// Simulated catch-up time before a promotion completes, in milliseconds
    #[serde(default)]
    pub catch_up_delay_ms: u64,
}

/// Controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Pending control commands before callers wait
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_journal_kind() -> String {
    "memory".to_string()
}

fn default_command_buffer() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            kind: default_journal_kind(),
            catch_up_delay_ms: 0,
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            command_buffer: default_command_buffer(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl WolfJournalConfig {
    /// Default configuration for a node
    pub fn for_node(node_id: impl Into<String>) -> Self {
        Self {
            node: NodeConfig { id: node_id.into() },
            journal: JournalConfig::default(),
            controller: ControllerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> crate::Result<Self> {
        let config: WolfJournalConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.node.id.is_empty() {
            return Err(crate::Error::Config("node.id cannot be empty".into()));
        }

        if self.journal.kind != "memory" {
            return Err(crate::Error::Config(format!(
                "journal.kind '{}' is not supported",
                self.journal.kind
            )));
        }

        if self.controller.command_buffer == 0 {
            return Err(crate::Error::Config("controller.command_buffer must be at least 1".into()));
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "compact") {
            return Err(crate::Error::Config(format!(
                "logging.format '{}' must be pretty or compact",
                self.logging.format
            )));
        }

        Ok(())
    }

    /// Get catch-up delay as Duration
    pub fn catch_up_delay(&self) -> Duration {
        Duration::from_millis(self.journal.catch_up_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_config() {
        let toml = r#"
[node]
id = "node-1"

[journal]
catch_up_delay_ms = 250

[controller]
command_buffer = 8

[logging]
level = "debug"
format = "compact"
"#;

        let config = WolfJournalConfig::from_str(toml).unwrap();
        assert_eq!(config.node.id, "node-1");
        assert_eq!(config.journal.kind, "memory");
        assert_eq!(config.catch_up_delay(), Duration::from_millis(250));
        assert_eq!(config.controller.command_buffer, 8);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_defaults_apply() {
        let config = WolfJournalConfig::from_str("[node]\nid = \"node-2\"\n").unwrap();
        assert_eq!(config.controller.command_buffer, 64);
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.catch_up_delay(), Duration::ZERO);
    }

    #[test]
    fn test_validation_errors() {
        assert!(WolfJournalConfig::from_str("[node]\nid = \"\"\n").is_err());
        assert!(WolfJournalConfig::from_str(
            "[node]\nid = \"n\"\n[journal]\nkind = \"disk\"\n"
        ).is_err());
        assert!(WolfJournalConfig::from_str(
            "[node]\nid = \"n\"\n[controller]\ncommand_buffer = 0\n"
        ).is_err());
        assert!(WolfJournalConfig::from_str(
            "[node]\nid = \"n\"\n[logging]\nformat = \"json\"\n"
        ).is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let config = WolfJournalConfig::for_node("node-3");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_toml().unwrap().as_bytes()).unwrap();

        let loaded = WolfJournalConfig::from_file(file.path()).unwrap();
        assert_eq!(loaded.node.id, "node-3");
        assert_eq!(loaded.journal.kind, "memory");
    }
}
