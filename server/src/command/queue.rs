//! The command queue handle shared by every request

use super::ack::{AckHandler, AckOutcome};
use super::dispatcher::{Dispatcher, IssuedCommand};
use super::error::QueueError;
use super::poller::{DeliveredCommand, PollerGateway};
use super::reaper::{Reaper, ReaperTask};
use super::record::CommandRecord;
use super::store::{CommandStore, Windows};
use doorlink_shared::{
    timing, Clock, CommandId, CommandKind, DiagnosticsResponse, SystemClock,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Tunables for the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    pub windows: Windows,
    /// Hold used for `activate` when the operator gives none
    pub default_hold_ms: u64,
    /// Relay channel wired to the door
    pub target: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            windows: Windows::default(),
            default_hold_ms: timing::DEFAULT_HOLD_MS,
            target: timing::DEFAULT_TARGET,
        }
    }
}

/// Cloneable handle over the store and the components working on it
///
/// Every operation reads the clock once and runs the reaper before touching
/// the store.
#[derive(Clone)]
pub struct CommandQueue {
    inner: Arc<Inner>,
}

struct Inner {
    config: QueueConfig,
    clock: Arc<dyn Clock>,
    store: Arc<CommandStore>,
    dispatcher: Dispatcher,
    poller: PollerGateway,
    acks: AckHandler,
    reaper: Arc<Reaper>,
}

impl CommandQueue {
    pub fn new(config: QueueConfig, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(CommandStore::new(config.windows));

        Self {
            inner: Arc::new(Inner {
                config,
                clock,
                dispatcher: Dispatcher::new(store.clone(), config.default_hold_ms),
                poller: PollerGateway::new(store.clone()),
                acks: AckHandler::new(store.clone()),
                reaper: Arc::new(Reaper::new(store.clone())),
                store,
            }),
        }
    }

    /// Read the clock and sweep expired records
    async fn tick(&self) -> u64 {
        let now = self.inner.clock.now_ms();
        self.inner.reaper.reap(now).await;
        now
    }

    /// Queue a command against the configured relay channel
    pub async fn issue(
        &self,
        kind: CommandKind,
        hold_duration: Option<u64>,
    ) -> Result<IssuedCommand, QueueError> {
        let now = self.tick().await;
        self.inner
            .dispatcher
            .issue(kind, self.inner.config.target, hold_duration, now)
            .await
    }

    pub async fn issue_unlock(
        &self,
        hold_duration: Option<u64>,
    ) -> Result<IssuedCommand, QueueError> {
        self.issue(CommandKind::Activate, hold_duration).await
    }

    pub async fn issue_lock(&self) -> Result<IssuedCommand, QueueError> {
        self.issue(CommandKind::Deactivate, None).await
    }

    /// Short relay pulse used to check the actuator wiring
    pub async fn issue_test_pulse(&self) -> Result<IssuedCommand, QueueError> {
        self.issue(CommandKind::Activate, Some(timing::TEST_PULSE_HOLD_MS))
            .await
    }

    pub async fn poll(&self) -> Option<DeliveredCommand> {
        let now = self.tick().await;
        self.inner.poller.poll(now).await
    }

    pub async fn acknowledge(&self, id: &CommandId, success: bool, message: &str) -> AckOutcome {
        self.tick().await;
        self.inner.acks.acknowledge(id, success, message).await
    }

    pub async fn get(&self, id: &CommandId) -> Result<CommandRecord, QueueError> {
        self.tick().await;
        self.inner.store.get(id).await
    }

    pub async fn list_undelivered(&self) -> Vec<CommandRecord> {
        let now = self.tick().await;
        self.inner.store.list_undelivered(now).await
    }

    /// Sweep now; returns how many records were removed
    pub async fn reap(&self) -> usize {
        let now = self.inner.clock.now_ms();
        self.inner.reaper.reap(now).await
    }

    /// Store summary for the actuator debug endpoint
    pub async fn diagnostics(&self) -> DiagnosticsResponse {
        let now = self.tick().await;
        let visibility_ms = self.inner.config.windows.visibility_ms;

        let mut records = self.inner.store.snapshot().await;
        records.sort_by_key(|r| r.seq);

        let active_ids = records
            .iter()
            .filter(|r| r.is_deliverable(now, visibility_ms))
            .map(|r| r.id.clone())
            .collect();

        let recent = records
            .iter()
            .rev()
            .take(timing::DIAGNOSTIC_RECENT_LIMIT)
            .map(CommandRecord::to_recent)
            .collect();

        DiagnosticsResponse {
            pending_count: records.len(),
            active_ids,
            recent,
        }
    }

    /// Spawn the periodic sweep on the current runtime
    pub fn spawn_reaper(&self, check_interval: Duration) -> JoinHandle<()> {
        let task = ReaperTask::new(
            self.inner.reaper.clone(),
            self.inner.clock.clone(),
            check_interval,
        );
        tokio::spawn(async move { task.run().await })
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new(QueueConfig::default(), Arc::new(SystemClock))
    }
}
