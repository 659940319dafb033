//! Poller gateway: hands queued commands to the actuator

use super::store::CommandStore;
use doorlink_shared::{CommandId, CommandKind, PollResponse};
use std::sync::Arc;
use tracing::{debug, info};

/// A command handed to the actuator by a poll
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveredCommand {
    pub id: CommandId,
    pub kind: CommandKind,
    pub target: u32,
    pub hold_duration: Option<u64>,
}

impl From<DeliveredCommand> for PollResponse {
    fn from(cmd: DeliveredCommand) -> Self {
        PollResponse::command(cmd.id, cmd.kind, cmd.target, cmd.hold_duration)
    }
}

pub struct PollerGateway {
    store: Arc<CommandStore>,
}

impl PollerGateway {
    pub fn new(store: Arc<CommandStore>) -> Self {
        Self { store }
    }

    /// Deliver the earliest issued eligible command, if any
    ///
    /// Delivery does not remove the record; a delivered record is simply
    /// never eligible again. Commands the actuator never received are not
    /// retried and expire through the reaper.
    pub async fn poll(&self, now_ms: u64) -> Option<DeliveredCommand> {
        let Some(record) = self.store.claim_next(now_ms).await else {
            debug!("Poll: no command");
            return None;
        };

        info!(
            command_id = %record.id,
            kind = %record.kind,
            channel = record.target,
            "Delivering command to actuator"
        );

        Some(DeliveredCommand {
            id: record.id,
            kind: record.kind,
            target: record.target,
            hold_duration: record.hold_duration,
        })
    }
}
