//! Audit trail for issue and acknowledgment events

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// One audited event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub operator: String,
    /// `success`, `failed`, `denied` or `unknown`
    pub outcome: String,
    pub action: String,
}

impl AuditEntry {
    pub fn new(
        operator: impl Into<String>,
        outcome: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            operator: operator.into(),
            outcome: outcome.into(),
            action: action.into(),
        }
    }
}

/// Destination for audit entries
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: AuditEntry);
}

/// Emits each entry as a structured event on the `audit` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, entry: AuditEntry) {
        info!(
            target: "audit",
            operator = %entry.operator,
            outcome = %entry.outcome,
            action = %entry.action,
            "Access logged"
        );
    }
}

/// Keeps entries in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditSink {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, entry: AuditEntry) {
        self.entries.lock().await.push(entry);
    }
}
