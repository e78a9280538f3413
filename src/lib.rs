//! WolfJournal - Journal Lifecycle and Role Controller
//!
//! Governs when a replicated metadata journal may start, stop, or switch
//! between PRIMARY and SECONDARY roles, and exposes the committed role to
//! the rest of the service.
//!
//! # Architecture
//!
//! A [`journal::JournalSystem`] owns the running flag and role of one
//! journal and calls into a concrete implementation through the
//! [`journal::JournalHooks`] trait. A [`controller::JournalController`]
//! drives it from a single actor in response to cluster and election
//! events, while request handlers read the role lock-free.
//!
//! # Features
//!
//! - Start/stop ordering that never exposes a half-started journal
//! - Role changes only while running; redundant changes are no-ops
//! - Hooks complete before the new role becomes visible
//! - Internal serialization of concurrent lifecycle calls
//! - State change notifications for request routers
//! - In-memory reference journal with fault injection

pub mod config;
pub mod error;
pub mod journal;
pub mod controller;
pub mod console;

pub use config::WolfJournalConfig;
pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::WolfJournalConfig;
    pub use crate::error::{Error, Result};
    pub use crate::journal::{JournalHooks, JournalRole, JournalState, JournalStatus, JournalSystem};
    pub use crate::controller::{ControlHandle, JournalController, LeadershipEvent};
}
