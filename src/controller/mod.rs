//! Control-Plane Controller
//!
//! Drives a [`JournalSystem`] from a single actor. Cluster coordination and
//! election callbacks hold a cloneable [`ControlHandle`]; every request goes
//! through one command channel and is applied strictly in arrival order.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::error::{Error, Result};
use crate::journal::{JournalHooks, JournalRole, JournalStatus, JournalSystem};

/// Leadership change reported by an election component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadershipEvent {
    /// This node won leadership
    Acquired,
    /// This node lost or gave up leadership
    Lost,
}

impl LeadershipEvent {
    /// Journal role matching this event
    pub fn target_role(self) -> JournalRole {
        match self {
            LeadershipEvent::Acquired => JournalRole::Primary,
            LeadershipEvent::Lost => JournalRole::Secondary,
        }
    }
}

/// Command processed by the controller loop
enum ControlCommand {
    Start(oneshot::Sender<Result<()>>),
    Stop(oneshot::Sender<Result<()>>),
    SetRole(JournalRole, oneshot::Sender<Result<()>>),
    Status(oneshot::Sender<JournalStatus>),
    Shutdown(oneshot::Sender<Result<()>>),
}

/// Single actor owning the control side of a journal system
pub struct JournalController<H: JournalHooks> {
    system: Arc<JournalSystem<H>>,
    command_rx: mpsc::Receiver<ControlCommand>,
}

impl<H: JournalHooks> JournalController<H> {
    /// Create a controller and its handle
    pub fn new(system: Arc<JournalSystem<H>>, command_buffer: usize) -> (Self, ControlHandle) {
        let (command_tx, command_rx) = mpsc::channel(command_buffer);

        (
            Self { system, command_rx },
            ControlHandle { command_tx },
        )
    }

    /// The journal system driven by this controller
    pub fn system(&self) -> &Arc<JournalSystem<H>> {
        &self.system
    }

    /// Process commands until shutdown is requested or every handle is gone
    ///
    /// A journal still running at exit is stopped. On an explicit shutdown the
    /// result of that stop goes to the requester; otherwise it is returned.
    pub async fn run(mut self) -> Result<()> {
        tracing::info!("Journal controller started for {}", self.system.node_id());

        while let Some(command) = self.command_rx.recv().await {
            match command {
                ControlCommand::Start(reply) => {
                    let result = self.start().await;
                    log_outcome("start", &result);
                    let _ = reply.send(result);
                }
                ControlCommand::Stop(reply) => {
                    let result = self.demote_and_stop().await;
                    log_outcome("stop", &result);
                    let _ = reply.send(result);
                }
                ControlCommand::SetRole(role, reply) => {
                    let result = self.system.set_role(role).await;
                    log_outcome("role change", &result);
                    let _ = reply.send(result);
                }
                ControlCommand::Status(reply) => {
                    let _ = reply.send(self.system.status());
                }
                ControlCommand::Shutdown(reply) => {
                    tracing::info!("Journal controller shutting down");
                    let _ = reply.send(self.stop_if_running().await);
                    return Ok(());
                }
            }
        }

        tracing::info!("All control handles dropped, journal controller exiting");
        self.stop_if_running().await
    }

    /// Start the journal so that it always comes up SECONDARY
    ///
    /// The guard keeps the role across stop/start. If a demotion before the
    /// previous stop failed, the journal is demoted right after start-up so
    /// that promotion has to go through gain-primacy again.
    async fn start(&self) -> Result<()> {
        self.system.start().await?;

        if self.system.role().is_primary() {
            tracing::warn!("Journal restarted holding PRIMARY, demoting before serving");
            self.system.set_role(JournalRole::Secondary).await?;
        }

        Ok(())
    }

    /// Demote a PRIMARY journal, then stop it
    ///
    /// The stop runs even when demotion fails; the first error is returned.
    async fn demote_and_stop(&self) -> Result<()> {
        let demoted = if self.system.is_running() && self.system.role().is_primary() {
            self.system.set_role(JournalRole::Secondary).await
        } else {
            Ok(())
        };

        if let Err(e) = &demoted {
            tracing::warn!("Demotion before stop failed, stopping anyway: {}", e);
        }

        let stopped = self.system.stop().await;
        demoted.and(stopped)
    }

    async fn stop_if_running(&self) -> Result<()> {
        if !self.system.is_running() {
            return Ok(());
        }

        self.demote_and_stop().await.map_err(|e| {
            tracing::error!("Failed to stop journal on controller exit: {}", e);
            e
        })
    }
}

/// Log a failed control command, separating caller mistakes from hook failures
fn log_outcome(operation: &str, result: &Result<()>) {
    let Err(e) = result else {
        return;
    };

    if e.is_precondition() {
        tracing::debug!("Rejected {}: {}", operation, e);
    } else if e.is_retryable() {
        tracing::warn!("Journal {} failed, may be retried: {}", operation, e);
    } else {
        tracing::error!("Journal {} failed: {}", operation, e);
    }
}

/// Cloneable handle used by control-plane callers
#[derive(Clone)]
pub struct ControlHandle {
    command_tx: mpsc::Sender<ControlCommand>,
}

impl ControlHandle {
    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> ControlCommand) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(command(tx))
            .await
            .map_err(|_| Error::ShuttingDown)?;
        rx.await.map_err(|_| Error::ShuttingDown)
    }

    /// Start the journal
    pub async fn start(&self) -> Result<()> {
        self.request(ControlCommand::Start).await?
    }

    /// Stop the journal
    pub async fn stop(&self) -> Result<()> {
        self.request(ControlCommand::Stop).await?
    }

    /// Switch the journal role
    pub async fn set_role(&self, role: JournalRole) -> Result<()> {
        self.request(|tx| ControlCommand::SetRole(role, tx)).await?
    }

    /// Apply a leadership change from the election component
    pub async fn on_leadership(&self, event: LeadershipEvent) -> Result<()> {
        tracing::debug!("Leadership event: {:?}", event);
        self.set_role(event.target_role()).await
    }

    /// Current journal status, as seen by the controller
    pub async fn status(&self) -> Result<JournalStatus> {
        self.request(ControlCommand::Status).await
    }

    /// Stop the journal if running and end the controller loop
    pub async fn shutdown(&self) -> Result<()> {
        self.request(ControlCommand::Shutdown).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::{HookCall, JournalState, MemoryJournal};

    fn spawn_controller() -> (
        Arc<JournalSystem<MemoryJournal>>,
        ControlHandle,
        tokio::task::JoinHandle<Result<()>>,
    ) {
        let system = Arc::new(JournalSystem::new("node-1".to_string(), MemoryJournal::new()));
        let (controller, handle) = JournalController::new(system.clone(), 16);
        let task = tokio::spawn(controller.run());
        (system, handle, task)
    }

    #[tokio::test]
    async fn test_leadership_events_drive_roles() {
        let (system, handle, _task) = spawn_controller();

        handle.start().await.unwrap();
        handle.on_leadership(LeadershipEvent::Acquired).await.unwrap();
        assert!(system.accepts_writes());

        handle.on_leadership(LeadershipEvent::Lost).await.unwrap();
        assert_eq!(system.role(), JournalRole::Secondary);

        let status = handle.status().await.unwrap();
        assert_eq!(status.state, JournalState::RunningSecondary);
        assert_eq!(status.role_transitions, 2);
    }

    #[tokio::test]
    async fn test_errors_reach_the_caller() {
        let (_system, handle, _task) = spawn_controller();

        let err = handle.set_role(JournalRole::Primary).await.unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));

        handle.start().await.unwrap();
        assert!(matches!(handle.start().await, Err(Error::AlreadyRunning)));
    }

    #[tokio::test]
    async fn test_commands_apply_in_order() {
        let (system, handle, _task) = spawn_controller();
        handle.start().await.unwrap();

        let events = [
            LeadershipEvent::Acquired,
            LeadershipEvent::Lost,
            LeadershipEvent::Acquired,
        ];
        for event in events {
            handle.on_leadership(event).await.unwrap();
        }

        assert_eq!(
            system.hooks().calls().await,
            vec![
                HookCall::StartUp,
                HookCall::GainPrimacy,
                HookCall::LosePrimacy,
                HookCall::GainPrimacy,
            ]
        );
    }

    #[tokio::test]
    async fn test_shutdown_stops_running_journal() {
        let (system, handle, task) = spawn_controller();
        handle.start().await.unwrap();
        handle.set_role(JournalRole::Primary).await.unwrap();

        handle.shutdown().await.unwrap();
        task.await.unwrap().unwrap();

        assert!(!system.is_running());
        assert!(!system.hooks().is_open().await);
        assert!(matches!(handle.status().await, Err(Error::ShuttingDown)));
    }

    #[tokio::test]
    async fn test_dropping_handles_stops_journal() {
        let (system, handle, task) = spawn_controller();
        handle.start().await.unwrap();

        drop(handle);
        task.await.unwrap().unwrap();

        assert!(!system.is_running());
        assert_eq!(system.hooks().count(HookCall::Shutdown).await, 1);
    }

    #[tokio::test]
    async fn test_restart_reenters_as_secondary() {
        let (system, handle, _task) = spawn_controller();
        handle.start().await.unwrap();
        handle.on_leadership(LeadershipEvent::Acquired).await.unwrap();

        handle.stop().await.unwrap();
        assert_eq!(system.role(), JournalRole::Secondary);

        handle.start().await.unwrap();
        assert_eq!(system.state(), JournalState::RunningSecondary);
        assert!(!system.accepts_writes());

        handle.on_leadership(LeadershipEvent::Acquired).await.unwrap();
        assert!(system.accepts_writes());
        assert_eq!(system.hooks().append("after restart").await.unwrap(), 1);

        assert_eq!(
            system.hooks().calls().await,
            vec![
                HookCall::StartUp,
                HookCall::GainPrimacy,
                HookCall::LosePrimacy,
                HookCall::Shutdown,
                HookCall::StartUp,
                HookCall::GainPrimacy,
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_demotion_still_stops_and_restart_demotes() {
        let (system, handle, _task) = spawn_controller();
        handle.start().await.unwrap();
        handle.set_role(JournalRole::Primary).await.unwrap();
        system.hooks().fail_next(HookCall::LosePrimacy).await;

        assert!(handle.stop().await.is_err());
        assert!(!system.is_running());

        handle.start().await.unwrap();
        assert_eq!(system.state(), JournalState::RunningSecondary);

        handle.set_role(JournalRole::Primary).await.unwrap();
        assert!(system.hooks().append("recovered").await.is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_demotes_primary_first() {
        let (system, handle, task) = spawn_controller();
        handle.start().await.unwrap();
        handle.set_role(JournalRole::Primary).await.unwrap();

        handle.shutdown().await.unwrap();
        task.await.unwrap().unwrap();

        assert_eq!(system.role(), JournalRole::Secondary);
        let calls = system.hooks().calls().await;
        assert_eq!(&calls[calls.len() - 2..], &[HookCall::LosePrimacy, HookCall::Shutdown]);
    }

    #[tokio::test]
    async fn test_dropping_handles_demotes_primary_first() {
        let (system, handle, task) = spawn_controller();
        handle.start().await.unwrap();
        handle.set_role(JournalRole::Primary).await.unwrap();

        drop(handle);
        task.await.unwrap().unwrap();

        assert!(!system.is_running());
        assert_eq!(system.role(), JournalRole::Secondary);
        assert_eq!(system.hooks().count(HookCall::LosePrimacy).await, 1);
    }

    #[tokio::test]
    async fn test_shutdown_of_stopped_journal_skips_hook() {
        let (system, handle, task) = spawn_controller();

        handle.shutdown().await.unwrap();
        task.await.unwrap().unwrap();

        assert!(system.hooks().calls().await.is_empty());
    }
}
