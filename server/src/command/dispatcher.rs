//! Command dispatcher for operator actuation intents

use super::error::QueueError;
use super::record::CommandRecord;
use super::store::CommandStore;
use doorlink_shared::{timing, CommandId, CommandKind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// A freshly queued command
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedCommand {
    pub id: CommandId,
    pub kind: CommandKind,
    pub target: u32,
    pub hold_duration: Option<u64>,
}

/// Builds command records and inserts them into the store
pub struct Dispatcher {
    store: Arc<CommandStore>,
    sequence: AtomicU64,
    default_hold_ms: u64,
}

impl Dispatcher {
    pub fn new(store: Arc<CommandStore>, default_hold_ms: u64) -> Self {
        Self {
            store,
            sequence: AtomicU64::new(0),
            default_hold_ms,
        }
    }

    /// Get the next issuance sequence number
    pub fn next_seq(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Queue a new command for the actuator
    ///
    /// `hold_duration` is only kept for `activate`; it falls back to the
    /// configured default when absent.
    pub async fn issue(
        &self,
        kind: CommandKind,
        target: u32,
        hold_duration: Option<u64>,
        now_ms: u64,
    ) -> Result<IssuedCommand, QueueError> {
        let seq = self.next_seq();
        let id = CommandId::new(now_ms, seq);

        let hold_duration = match kind {
            CommandKind::Activate => Some(hold_duration.unwrap_or(self.default_hold_ms)),
            CommandKind::Deactivate => None,
        };

        let record = CommandRecord::new(id.clone(), seq, kind, target, hold_duration, now_ms);
        self.store.insert(record).await?;

        info!(command_id = %id, %kind, channel = target, ?hold_duration, "Command queued");

        Ok(IssuedCommand {
            id,
            kind,
            target,
            hold_duration,
        })
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Arc::new(CommandStore::default()), timing::DEFAULT_HOLD_MS)
    }
}
