//! Command executor - validates and dispatches polled commands

use super::handlers::{self, HandlerContext};
use crate::relay::Relay;
use doorlink_shared::{timing, CommandId, CommandKind, ConfirmRequest, PollResponse};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Result of command execution
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Relay switched as requested
    Completed { message: String },
    /// Relay refused to switch
    Failed { message: String },
}

/// A command received from a poll
#[derive(Debug, Clone, PartialEq)]
pub struct ActuatorCommand {
    pub id: CommandId,
    pub kind: CommandKind,
    pub target: u32,
    pub hold_duration: Option<u64>,
}

impl ActuatorCommand {
    /// Extract the command from a poll response, if it carries a complete one
    pub fn from_poll(resp: PollResponse) -> Option<Self> {
        if !resp.has_command {
            return None;
        }
        Some(Self {
            id: resp.command_id?,
            kind: resp.kind?,
            target: resp.target?,
            hold_duration: resp.hold_duration,
        })
    }
}

/// Executes commands against the relay
pub struct CommandExecutor {
    relay: Arc<dyn Relay>,
    generations: Arc<Mutex<HashMap<u32, u64>>>,
}

impl CommandExecutor {
    /// Create a new command executor
    pub fn new(relay: Arc<dyn Relay>) -> Self {
        Self {
            relay,
            generations: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Execute a command and build the confirmation for the server
    pub async fn execute(&self, command: &ActuatorCommand) -> ConfirmRequest {
        info!(
            "Executing command: id={} kind={} target={}",
            command.id, command.kind, command.target
        );

        let ctx = HandlerContext {
            relay: self.relay.clone(),
            target: command.target,
            generations: self.generations.clone(),
        };

        let result = match command.kind {
            CommandKind::Activate => {
                let hold_ms = command.hold_duration.unwrap_or(timing::DEFAULT_HOLD_MS);
                handlers::handle_activate(&ctx, hold_ms).await
            }
            CommandKind::Deactivate => handlers::handle_deactivate(&ctx).await,
        };

        match result {
            CommandResult::Completed { message } => {
                info!("  Command completed: {}", message);
                ConfirmRequest::completed(command.id.clone(), message)
            }
            CommandResult::Failed { message } => {
                warn!("  Command failed: {}", message);
                ConfirmRequest::failed(command.id.clone(), message)
            }
        }
    }
}
