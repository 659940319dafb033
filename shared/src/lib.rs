//! Doorlink Shared Protocol Types
//!
//! This crate provides the wire types, timing constants and clock
//! abstraction shared between the command queue server and the door
//! actuator agent.

pub mod clock;
pub mod protocol;

use std::time::{SystemTime, UNIX_EPOCH};

// Re-export commonly used types at crate root
pub use clock::{Clock, ManualClock, SystemClock};
pub use protocol::*;

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Timing and sizing parameters for the command queue
pub mod timing {
    /// How long an undelivered command stays eligible for delivery
    pub const VISIBILITY_WINDOW_MS: u64 = 60_000;

    /// Maximum age of any command before it is swept from the store
    pub const RETENTION_WINDOW_MS: u64 = 300_000;

    /// Relay hold time for `activate` when the operator gives none
    pub const DEFAULT_HOLD_MS: u64 = 10_000;

    /// Relay hold time for the actuator test pulse
    pub const TEST_PULSE_HOLD_MS: u64 = 5_000;

    /// The single relay channel wired to the door lock
    pub const DEFAULT_TARGET: u32 = 1;

    /// Number of records shown in the diagnostics `recent` list
    pub const DIAGNOSTIC_RECENT_LIMIT: usize = 5;

    /// Interval between actuator polls
    pub const POLL_INTERVAL_MS: u64 = 2_000;
}
