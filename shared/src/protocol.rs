//! JSON wire types for the operator and actuator HTTP surface

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque command identifier
///
/// Rendered as `<created_at_ms>-<seq>`; clients must treat it as an
/// opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(String);

impl CommandId {
    /// Build an id from an issuance timestamp and a sequence counter
    pub fn new(created_at_ms: u64, seq: u64) -> Self {
        Self(format!("{}-{}", created_at_ms, seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CommandId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CommandId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Relay action requested by an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    /// Engage the relay (door open)
    Activate,
    /// Release the relay (door closed/idle)
    Deactivate,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Activate => write!(f, "activate"),
            CommandKind::Deactivate => write!(f, "deactivate"),
        }
    }
}

/// Outcome reported by the actuator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    #[default]
    Pending,
    Confirmed,
    Failed,
}

/// Operator request for `POST /door/unlock`, `/door/lock` and the test pulse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRequest {
    pub operator: String,
    /// Optional relay hold override in milliseconds (unlock only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold_duration: Option<u64>,
}

/// Response to an issued command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueResponse {
    pub command_id: CommandId,
    pub target: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold_duration: Option<u64>,
}

/// Response to `GET /actuator/command`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollResponse {
    pub has_command: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_id: Option<CommandId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<CommandKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold_duration: Option<u64>,
}

impl PollResponse {
    /// Nothing to do
    pub fn empty() -> Self {
        Self {
            has_command: false,
            command_id: None,
            kind: None,
            target: None,
            hold_duration: None,
        }
    }

    /// A command handed to the actuator
    pub fn command(
        command_id: CommandId,
        kind: CommandKind,
        target: u32,
        hold_duration: Option<u64>,
    ) -> Self {
        Self {
            has_command: true,
            command_id: Some(command_id),
            kind: Some(kind),
            target: Some(target),
            hold_duration,
        }
    }
}

/// Actuator report for `POST /actuator/confirm`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmRequest {
    pub command_id: CommandId,
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

impl ConfirmRequest {
    pub fn completed(command_id: CommandId, message: impl Into<String>) -> Self {
        Self {
            command_id,
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(command_id: CommandId, message: impl Into<String>) -> Self {
        Self {
            command_id,
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmResponse {
    pub acknowledged: bool,
}

/// One entry of the diagnostics `recent` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentCommand {
    pub id: CommandId,
    pub kind: CommandKind,
    pub target: u32,
    pub created_at: u64,
    pub delivered: bool,
    pub outcome: Outcome,
}

/// Response to `GET /actuator/debug`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsResponse {
    /// Number of records currently held by the store
    pub pending_count: usize,
    /// Ids still eligible for delivery
    pub active_ids: Vec<CommandId>,
    /// Most recent records, newest first
    pub recent: Vec<RecentCommand>,
}

/// Free-form actuator status report for `POST /actuator/status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    #[serde(default = "unknown_status")]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub ip_address: String,
}

fn unknown_status() -> String {
    "unknown".into()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusAck {
    pub received: bool,
}

/// Response to `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp_ms: u64,
}
