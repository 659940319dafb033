//! Activate (unlock) command handler

use super::HandlerContext;
use crate::command::CommandResult;
use std::time::Duration;
use tracing::{info, warn};

/// Handle `activate`: engage the relay, release it after `hold_ms`
pub async fn handle_activate(ctx: &HandlerContext, hold_ms: u64) -> CommandResult {
    if let Err(e) = ctx.relay.engage(ctx.target).await {
        return CommandResult::Failed {
            message: format!("Failed to engage relay {}: {}", ctx.target, e),
        };
    }

    let generation = {
        let mut generations = ctx.generations.lock().await;
        let entry = generations.entry(ctx.target).or_insert(0);
        *entry += 1;
        *entry
    };

    info!("  [ACTIVATE] relay {} engaged for {}ms", ctx.target, hold_ms);

    let relay = ctx.relay.clone();
    let generations = ctx.generations.clone();
    let target = ctx.target;
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(hold_ms)).await;

        // A newer activation owns the channel now
        if generations.lock().await.get(&target).copied() != Some(generation) {
            return;
        }

        match relay.release(target).await {
            Ok(()) => info!("  [ACTIVATE] relay {} auto-released", target),
            Err(e) => warn!("  [ACTIVATE] auto-release of relay {} failed: {}", target, e),
        }
    });

    CommandResult::Completed {
        message: format!("Relay {} activated for {}ms", ctx.target, hold_ms),
    }
}
