//! Expiry sweeping for stale commands

use super::store::CommandStore;
use doorlink_shared::Clock;
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

/// Removes records that outlived the retention window
pub struct Reaper {
    store: Arc<CommandStore>,
}

impl Reaper {
    pub fn new(store: Arc<CommandStore>) -> Self {
        Self { store }
    }

    /// Sweep once; returns how many records were removed
    pub async fn reap(&self, now_ms: u64) -> usize {
        let removed = self.store.sweep_expired(now_ms).await;
        if removed > 0 {
            info!(removed, "Reaped expired commands");
        } else {
            debug!("Reaper: nothing expired");
        }
        removed
    }
}

/// Periodic background sweep
///
/// Correctness never depends on this task; the queue reaps before every
/// store access anyway.
pub struct ReaperTask {
    reaper: Arc<Reaper>,
    clock: Arc<dyn Clock>,
    check_interval: Duration,
}

impl ReaperTask {
    pub fn new(reaper: Arc<Reaper>, clock: Arc<dyn Clock>, check_interval: Duration) -> Self {
        Self {
            reaper,
            clock,
            check_interval,
        }
    }

    /// Start the sweep loop
    pub async fn run(&self) {
        let mut ticker = interval(self.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.reaper.reap(self.clock.now_ms()).await;
        }
    }
}
