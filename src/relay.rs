//! Relay driver abstraction
//!
//! The GPIO driver lives outside this crate; the agent only needs to
//! engage and release a channel.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// A switchable relay bank
#[async_trait]
pub trait Relay: Send + Sync {
    /// Energize the channel (door open)
    async fn engage(&self, target: u32) -> Result<()>;

    /// De-energize the channel (door locked); releasing an idle channel is fine
    async fn release(&self, target: u32) -> Result<()>;

    /// Human-readable name for this driver
    fn name(&self) -> &'static str;
}

/// In-memory relay for development and tests
#[derive(Debug, Clone, Default)]
pub struct SimulatedRelay {
    channels: Arc<Mutex<HashMap<u32, bool>>>,
    /// Channels that refuse to switch
    jammed: Arc<Mutex<Vec<u32>>>,
}

impl SimulatedRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_engaged(&self, target: u32) -> bool {
        self.channels
            .lock()
            .await
            .get(&target)
            .copied()
            .unwrap_or(false)
    }

    /// Make a channel fail every switch attempt
    pub async fn jam(&self, target: u32) {
        self.jammed.lock().await.push(target);
    }

    async fn switch(&self, target: u32, engaged: bool) -> Result<()> {
        if self.jammed.lock().await.contains(&target) {
            anyhow::bail!("Relay channel {} is jammed", target);
        }
        self.channels.lock().await.insert(target, engaged);
        info!(channel = target, engaged, "[RELAY] switched");
        Ok(())
    }
}

#[async_trait]
impl Relay for SimulatedRelay {
    async fn engage(&self, target: u32) -> Result<()> {
        self.switch(target, true).await
    }

    async fn release(&self, target: u32) -> Result<()> {
        self.switch(target, false).await
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}
