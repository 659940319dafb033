//! Deactivate (lock) command handler

use super::HandlerContext;
use crate::command::CommandResult;
use tracing::info;

/// Handle `deactivate`: release the relay immediately
pub async fn handle_deactivate(ctx: &HandlerContext) -> CommandResult {
    // Cancel any pending auto-release from an earlier activation
    *ctx.generations.lock().await.entry(ctx.target).or_insert(0) += 1;

    match ctx.relay.release(ctx.target).await {
        Ok(()) => {
            info!("  [DEACTIVATE] relay {} released", ctx.target);
            CommandResult::Completed {
                message: format!("Relay {} deactivated", ctx.target),
            }
        }
        Err(e) => CommandResult::Failed {
            message: format!("Failed to release relay {}: {}", ctx.target, e),
        },
    }
}
