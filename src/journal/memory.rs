//! In-Memory Journal
//!
//! Reference hook implementation that keeps entries in memory. Used by the
//! `wolfjournal run` console and by tests; it records every hook call and
//! supports one-shot fault injection per hook.

use std::time::Duration;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::hooks::JournalHooks;
use crate::error::{Error, Result};

/// A hook invocation recorded by [`MemoryJournal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HookCall {
    StartUp,
    Shutdown,
    GainPrimacy,
    LosePrimacy,
}

impl std::fmt::Display for HookCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookCall::StartUp => write!(f, "start-up"),
            HookCall::Shutdown => write!(f, "shutdown"),
            HookCall::GainPrimacy => write!(f, "gain-primacy"),
            HookCall::LosePrimacy => write!(f, "lose-primacy"),
        }
    }
}

/// Entry appended while primary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub sequence: u64,
    pub payload: String,
}

#[derive(Default)]
struct Inner {
    /// Storage opened by start-up
    open: bool,
    /// Local append path opened by gain-primacy
    appending: bool,
    entries: Vec<JournalEntry>,
    next_sequence: u64,
    calls: Vec<HookCall>,
    /// Hooks that fail on their next invocation
    faults: Vec<HookCall>,
}

/// In-memory journal
pub struct MemoryJournal {
    inner: RwLock<Inner>,
    /// Simulated catch-up before opening the append path
    catch_up_delay: Duration,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::with_catch_up_delay(Duration::ZERO)
    }

    /// Create a journal whose gain-primacy hook waits `delay` before
    /// opening the append path
    pub fn with_catch_up_delay(delay: Duration) -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_sequence: 1,
                ..Inner::default()
            }),
            catch_up_delay: delay,
        }
    }

    /// Make the next invocation of `hook` fail
    pub async fn fail_next(&self, hook: HookCall) {
        self.inner.write().await.faults.push(hook);
    }

    /// Append a payload to the local log
    ///
    /// Only possible while the append path is open (primary).
    pub async fn append(&self, payload: impl Into<String>) -> Result<u64> {
        let mut inner = self.inner.write().await;
        if !inner.appending {
            return Err(Error::NotPrimary);
        }

        let sequence = inner.next_sequence;
        inner.next_sequence += 1;
        inner.entries.push(JournalEntry {
            sequence,
            payload: payload.into(),
        });

        Ok(sequence)
    }

    /// All appended entries, in order
    pub async fn entries(&self) -> Vec<JournalEntry> {
        self.inner.read().await.entries.clone()
    }

    /// Hook invocations, in order
    pub async fn calls(&self) -> Vec<HookCall> {
        self.inner.read().await.calls.clone()
    }

    /// Number of times `hook` was invoked
    pub async fn count(&self, hook: HookCall) -> usize {
        self.inner.read().await.calls.iter().filter(|c| **c == hook).count()
    }

    pub async fn is_open(&self) -> bool {
        self.inner.read().await.open
    }

    pub async fn is_appending(&self) -> bool {
        self.inner.read().await.appending
    }

    /// Record the call and consume a pending fault for it
    async fn enter(&self, hook: HookCall) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.calls.push(hook);

        if let Some(pos) = inner.faults.iter().position(|f| *f == hook) {
            inner.faults.remove(pos);
            return Err(Error::Journal(format!("injected {} failure", hook)));
        }

        Ok(())
    }
}

impl Default for MemoryJournal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl JournalHooks for MemoryJournal {
    async fn start_internal(&self) -> Result<()> {
        self.enter(HookCall::StartUp).await?;
        self.inner.write().await.open = true;
        tracing::debug!("Memory journal opened");
        Ok(())
    }

    async fn stop_internal(&self) -> Result<()> {
        // Resources are released even when the hook reports failure
        let result = self.enter(HookCall::Shutdown).await;

        let mut inner = self.inner.write().await;
        inner.appending = false;
        inner.open = false;
        tracing::debug!("Memory journal closed ({} entries)", inner.entries.len());

        result
    }

    async fn gain_primacy(&self) -> Result<()> {
        self.enter(HookCall::GainPrimacy).await?;

        if !self.catch_up_delay.is_zero() {
            tracing::debug!("Catching up for {:?} before accepting appends", self.catch_up_delay);
            tokio::time::sleep(self.catch_up_delay).await;
        }

        let mut inner = self.inner.write().await;
        if !inner.open {
            return Err(Error::Journal("storage is not open".into()));
        }
        inner.appending = true;
        Ok(())
    }

    async fn lose_primacy(&self) -> Result<()> {
        self.enter(HookCall::LosePrimacy).await?;
        self.inner.write().await.appending = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_requires_primacy() {
        let journal = MemoryJournal::new();
        journal.start_internal().await.unwrap();

        assert!(matches!(journal.append("a").await, Err(Error::NotPrimary)));

        journal.gain_primacy().await.unwrap();
        assert_eq!(journal.append("a").await.unwrap(), 1);
        assert_eq!(journal.append("b").await.unwrap(), 2);

        journal.lose_primacy().await.unwrap();
        assert!(matches!(journal.append("c").await, Err(Error::NotPrimary)));

        let payloads: Vec<_> = journal.entries().await.into_iter().map(|e| e.payload).collect();
        assert_eq!(payloads, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_fault_injection_is_one_shot() {
        let journal = MemoryJournal::new();
        journal.fail_next(HookCall::StartUp).await;

        assert!(journal.start_internal().await.is_err());
        assert!(!journal.is_open().await);

        journal.start_internal().await.unwrap();
        assert!(journal.is_open().await);
        assert_eq!(journal.count(HookCall::StartUp).await, 2);
    }

    #[tokio::test]
    async fn test_failed_shutdown_still_closes() {
        let journal = MemoryJournal::new();
        journal.start_internal().await.unwrap();
        journal.gain_primacy().await.unwrap();
        journal.fail_next(HookCall::Shutdown).await;

        assert!(journal.stop_internal().await.is_err());
        assert!(!journal.is_open().await);
        assert!(!journal.is_appending().await);
    }

    #[tokio::test]
    async fn test_sequence_survives_restart() {
        let journal = MemoryJournal::new();
        journal.start_internal().await.unwrap();
        journal.gain_primacy().await.unwrap();
        journal.append("a").await.unwrap();
        journal.stop_internal().await.unwrap();

        journal.start_internal().await.unwrap();
        journal.gain_primacy().await.unwrap();
        assert_eq!(journal.append("b").await.unwrap(), 2);
    }
}
