//! Acknowledgment handling for actuator outcome reports

use super::error::QueueError;
use super::lifecycle::LifecycleEvent;
use super::record::CommandRecord;
use super::store::CommandStore;
use doorlink_shared::CommandId;
use std::sync::Arc;
use tracing::{info, warn};

/// What an acknowledgment did to the store
#[derive(Debug, Clone, PartialEq)]
pub enum AckOutcome {
    /// Success reported; the record was removed
    Confirmed(CommandRecord),
    /// Failure reported; the record is kept until reaped
    Failed(CommandRecord),
    /// No such record, most likely already expired
    Unknown,
}

pub struct AckHandler {
    store: Arc<CommandStore>,
}

impl AckHandler {
    pub fn new(store: Arc<CommandStore>) -> Self {
        Self { store }
    }

    /// Reconcile an actuator report
    ///
    /// Unknown ids are a benign no-op. Failures are terminal and never
    /// redelivered.
    pub async fn acknowledge(&self, id: &CommandId, success: bool, message: &str) -> AckOutcome {
        let event = if success {
            LifecycleEvent::AckSuccess
        } else {
            LifecycleEvent::AckFailure(message.to_string())
        };

        match self.store.apply(id, event).await {
            Ok((record, _)) if success => {
                info!(command_id = %id, report = message, "Actuator confirmed command");
                AckOutcome::Confirmed(record)
            }
            Ok((record, _)) => {
                warn!(command_id = %id, report = message, "Actuator reported failure");
                AckOutcome::Failed(record)
            }
            Err(QueueError::NotFound(_)) => {
                warn!(command_id = %id, success, "Acknowledgment for unknown command");
                AckOutcome::Unknown
            }
            Err(e) => {
                warn!(command_id = %id, error = %e, "Acknowledgment not applied");
                AckOutcome::Unknown
            }
        }
    }
}
