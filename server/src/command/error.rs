//! Errors raised by the command queue

use doorlink_shared::CommandId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Command not found: {0}")]
    NotFound(CommandId),

    #[error("Duplicate command id: {0}")]
    DuplicateId(CommandId),
}
