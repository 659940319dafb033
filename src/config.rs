//! Actuator agent configuration

use anyhow::{Context, Result};
use doorlink_shared::timing;
use std::time::Duration;

/// Configuration for the actuator agent
#[derive(Debug, Clone)]
pub struct ActuatorConfig {
    /// Identifier reported in status updates
    pub device_id: String,
    /// Base URL of the command queue server
    pub server_url: String,
    /// Delay between polls
    pub poll_interval: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            device_id: "door-actuator-01".into(),
            server_url: "http://127.0.0.1:5000".into(),
            poll_interval: Duration::from_millis(timing::POLL_INTERVAL_MS),
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl ActuatorConfig {
    /// Load from `DOORLINK_*` environment variables over the defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(id) = lookup("DOORLINK_DEVICE_ID") {
            config.device_id = id;
        }
        if let Some(url) = lookup("DOORLINK_SERVER_URL") {
            config.server_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ms) = lookup("DOORLINK_POLL_INTERVAL_MS") {
            let ms: u64 = ms
                .trim()
                .parse()
                .with_context(|| format!("Invalid DOORLINK_POLL_INTERVAL_MS: {:?}", ms))?;
            config.poll_interval = Duration::from_millis(ms.max(1));
        }
        if let Some(ms) = lookup("DOORLINK_REQUEST_TIMEOUT_MS") {
            let ms: u64 = ms
                .trim()
                .parse()
                .with_context(|| format!("Invalid DOORLINK_REQUEST_TIMEOUT_MS: {:?}", ms))?;
            config.request_timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }
}
