//! Server configuration
//!
//! Defaults match the single-door deployment; any field can be overridden
//! through `DOORLINK_*` environment variables.

use crate::auth::Role;
use crate::command::{QueueConfig, Windows};
use doorlink_shared::timing;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const ENV_BIND: &str = "DOORLINK_BIND";
pub const ENV_TARGET: &str = "DOORLINK_TARGET";
pub const ENV_VISIBILITY_MS: &str = "DOORLINK_VISIBILITY_MS";
pub const ENV_RETENTION_MS: &str = "DOORLINK_RETENTION_MS";
pub const ENV_HOLD_MS: &str = "DOORLINK_HOLD_MS";
pub const ENV_SWEEP_INTERVAL_MS: &str = "DOORLINK_SWEEP_INTERVAL_MS";
pub const ENV_OPERATORS: &str = "DOORLINK_OPERATORS";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Invalid operator entry {0:?}, expected name:role")]
    InvalidOperator(String),

    #[error("Visibility window ({visibility_ms}ms) must be below retention ({retention_ms}ms)")]
    WindowOrder { visibility_ms: u64, retention_ms: u64 },
}

/// Configuration for the command queue server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen address
    pub bind: SocketAddr,
    pub queue: QueueConfig,
    /// Background sweep interval; `None` leaves only the per-request sweep
    pub sweep_interval: Option<Duration>,
    /// Operator roster; empty means open mode
    pub operators: Vec<(String, Role)>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            queue: QueueConfig::default(),
            sweep_interval: Some(Duration::from_secs(30)),
            operators: vec![("admin".into(), Role::Admin)],
        }
    }
}

impl ServerConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind = parse_or(&lookup, ENV_BIND, defaults.bind)?;
        let target = parse_or(&lookup, ENV_TARGET, defaults.queue.target)?;
        let visibility_ms = parse_or(
            &lookup,
            ENV_VISIBILITY_MS,
            defaults.queue.windows.visibility_ms,
        )?;
        let retention_ms = parse_or(
            &lookup,
            ENV_RETENTION_MS,
            defaults.queue.windows.retention_ms,
        )?;
        let default_hold_ms = parse_or(&lookup, ENV_HOLD_MS, timing::DEFAULT_HOLD_MS)?;
        let sweep_ms: u64 = parse_or(&lookup, ENV_SWEEP_INTERVAL_MS, 30_000)?;

        if visibility_ms >= retention_ms {
            return Err(ConfigError::WindowOrder {
                visibility_ms,
                retention_ms,
            });
        }

        let operators = match lookup(ENV_OPERATORS) {
            Some(raw) => parse_operators(&raw)?,
            None => defaults.operators,
        };

        Ok(Self {
            bind,
            queue: QueueConfig {
                windows: Windows {
                    visibility_ms,
                    retention_ms,
                },
                default_hold_ms,
                target,
            },
            sweep_interval: (sweep_ms > 0).then(|| Duration::from_millis(sweep_ms)),
            operators,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        None => Ok(default),
    }
}

/// Parse `name:role,name:role`; an empty string yields an empty roster
fn parse_operators(raw: &str) -> Result<Vec<(String, Role)>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, role) = entry
                .split_once(':')
                .ok_or_else(|| ConfigError::InvalidOperator(entry.to_string()))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(ConfigError::InvalidOperator(entry.to_string()));
            }
            let role = role
                .parse::<Role>()
                .map_err(|_| ConfigError::InvalidOperator(entry.to_string()))?;
            Ok((name.to_string(), role))
        })
        .collect()
}
