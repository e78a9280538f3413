//! Journal Module
//!
//! Lifecycle and role guard for a replicated journal, the hook contract a
//! concrete journal implements, and an in-memory reference journal.

mod role;
mod hooks;
mod system;
pub mod memory;

pub use role::{JournalRole, JournalState};
pub use hooks::JournalHooks;
pub use system::{JournalSystem, JournalStatus};
pub use memory::{MemoryJournal, HookCall, JournalEntry};
