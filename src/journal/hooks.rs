//! Journal Hook Contract
//!
//! Operations a concrete journal supplies. The lifecycle guard in
//! [`super::JournalSystem`] decides when each one runs; implementations
//! only decide what it does.

use crate::error::Result;

/// Hooks invoked by the journal lifecycle guard
///
/// Every hook is awaited to completion before the guard publishes the
/// resulting state, so an implementation may block on I/O or peers for as
/// long as it needs. No timeout is imposed; cancellation, if wanted, must be
/// built into the hook itself.
#[async_trait::async_trait]
pub trait JournalHooks: Send + Sync {
    /// Open storage, connect to peers and begin replaying committed entries.
    ///
    /// On error the journal stays stopped.
    async fn start_internal(&self) -> Result<()>;

    /// Best-effort teardown: flush, close connections, release resources.
    ///
    /// Runs after the journal is already marked stopped.
    async fn stop_internal(&self) -> Result<()>;

    /// Stop following the upstream primary, catch up to the latest committed
    /// position and open the local append path.
    ///
    /// On error the journal stays secondary.
    async fn gain_primacy(&self) -> Result<()>;

    /// Flush and close the local append path and resume following whichever
    /// node is primary.
    ///
    /// On error the journal stays primary.
    async fn lose_primacy(&self) -> Result<()>;
}
