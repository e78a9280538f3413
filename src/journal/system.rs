//! Journal Lifecycle Guard
//!
//! Owns the running flag and the current role of one journal, enforces the
//! ordering rules for start, stop and role transitions, and dispatches to
//! the concrete journal's hooks.
//!
//! Readers (`role`, `is_running`, `accepts_writes`) are lock-free and always
//! see the last committed value. Writers (`start`, `stop`, `set_role`) are
//! serialized by an internal mutex held across check, hook and update, so
//! racing control-plane calls cannot interleave.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};

use super::hooks::JournalHooks;
use super::role::{JournalRole, JournalState};
use crate::error::{Error, Result};

/// Point-in-time view of a journal system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalStatus {
    /// Owning node
    pub node_id: String,
    /// Whether the journal is running
    pub running: bool,
    /// Last committed role
    pub role: JournalRole,
    /// Derived lifecycle state
    pub state: JournalState,
    /// Committed role changes since construction
    pub role_transitions: u64,
    /// Successful starts since construction
    pub starts: u64,
}

/// Lifecycle and role guard for a single journal
pub struct JournalSystem<H: JournalHooks> {
    /// Node ID
    node_id: String,
    /// Concrete journal
    hooks: H,
    /// Encoded `JournalRole`
    role: AtomicU8,
    /// Running flag
    running: AtomicBool,
    /// Serializes start/stop/set_role
    transition: Mutex<()>,
    /// Committed state notifications
    state_tx: watch::Sender<JournalState>,
    /// Committed role changes
    role_transitions: AtomicU64,
    /// Successful starts
    starts: AtomicU64,
}

impl<H: JournalHooks> JournalSystem<H> {
    /// Create an inert journal system: stopped, SECONDARY
    pub fn new(node_id: String, hooks: H) -> Self {
        let (state_tx, _) = watch::channel(JournalState::Stopped);

        Self {
            node_id,
            hooks,
            role: AtomicU8::new(JournalRole::Secondary.as_u8()),
            running: AtomicBool::new(false),
            transition: Mutex::new(()),
            state_tx,
            role_transitions: AtomicU64::new(0),
            starts: AtomicU64::new(0),
        }
    }

    /// Start the journal
    ///
    /// Runs the start-up hook and marks the journal running only once the
    /// hook succeeds. A hook error is returned unchanged and the journal
    /// stays stopped. Starting a running journal is rejected without calling
    /// the hook.
    pub async fn start(&self) -> Result<()> {
        let _transition = self.transition.lock().await;

        if self.is_running() {
            return Err(Error::AlreadyRunning);
        }

        tracing::info!(
            "Starting journal system (node: {}, role: {})",
            self.node_id,
            self.role()
        );

        if let Err(e) = self.hooks.start_internal().await {
            tracing::error!("Journal start-up failed on {}: {}", self.node_id, e);
            return Err(e);
        }

        self.running.store(true, Ordering::Release);
        self.starts.fetch_add(1, Ordering::Relaxed);
        self.publish();

        tracing::info!("Journal system running as {}", self.role());
        Ok(())
    }

    /// Stop the journal
    ///
    /// The running flag is cleared before the shutdown hook runs, so no role
    /// change can start once this call holds the guard. A shutdown error is
    /// returned unchanged; the journal stays stopped regardless. The hook is
    /// invoked even when the journal is not running, so resources left by a
    /// failed start can be released.
    pub async fn stop(&self) -> Result<()> {
        let _transition = self.transition.lock().await;

        if self.running.swap(false, Ordering::AcqRel) {
            self.publish();
            tracing::info!("Stopping journal system (node: {})", self.node_id);
        } else {
            tracing::debug!("Stop requested on a journal that is not running");
        }

        if let Err(e) = self.hooks.stop_internal().await {
            tracing::error!("Journal shutdown failed on {}: {}", self.node_id, e);
            return Err(e);
        }

        Ok(())
    }

    /// Switch the journal role
    ///
    /// Fails with `InvalidState` unless the journal is running. Requesting the
    /// current role is a no-op. Otherwise the matching primacy hook runs to
    /// completion before the new role becomes visible; if it fails, the role
    /// is left unchanged and the hook's error is returned.
    pub async fn set_role(&self, requested: JournalRole) -> Result<()> {
        let _transition = self.transition.lock().await;

        if !self.is_running() {
            return Err(Error::InvalidState(format!(
                "cannot change journal role to {} while it is not running",
                requested
            )));
        }

        let current = self.role();
        if current == requested {
            tracing::debug!("Journal already {}, ignoring role change", current);
            return Ok(());
        }

        let result = match requested {
            JournalRole::Primary => self.hooks.gain_primacy().await,
            JournalRole::Secondary => self.hooks.lose_primacy().await,
        };

        if let Err(e) = result {
            tracing::warn!(
                "Journal role change {} -> {} failed, keeping {}: {}",
                current,
                requested,
                current,
                e
            );
            return Err(e);
        }

        self.role.store(requested.as_u8(), Ordering::Release);
        self.role_transitions.fetch_add(1, Ordering::Relaxed);
        self.publish();

        tracing::info!(
            "Journal role changed {} -> {} (node: {})",
            current,
            requested,
            self.node_id
        );
        Ok(())
    }

    /// Last committed role
    pub fn role(&self) -> JournalRole {
        let raw = self.role.load(Ordering::Acquire);
        match JournalRole::try_from(raw) {
            Ok(role) => role,
            Err(e) => unreachable!("journal role cell corrupted: {}", e),
        }
    }

    /// Whether the journal is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Derived lifecycle state
    pub fn state(&self) -> JournalState {
        JournalState::from_parts(self.is_running(), self.role())
    }

    /// Whether local writes may be admitted (running and PRIMARY)
    pub fn accepts_writes(&self) -> bool {
        self.is_running() && self.role().is_primary()
    }

    /// Subscribe to committed state changes
    pub fn subscribe(&self) -> watch::Receiver<JournalState> {
        self.state_tx.subscribe()
    }

    /// Snapshot of the journal's status
    pub fn status(&self) -> JournalStatus {
        let running = self.is_running();
        let role = self.role();

        JournalStatus {
            node_id: self.node_id.clone(),
            running,
            role,
            state: JournalState::from_parts(running, role),
            role_transitions: self.role_transitions.load(Ordering::Relaxed),
            starts: self.starts.load(Ordering::Relaxed),
        }
    }

    /// The concrete journal
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Get node ID
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state());
    }
}
