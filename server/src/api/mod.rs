//! HTTP surface for operators and the actuator
//!
//! Thin JSON wrappers around the command queue. Malformed payloads are
//! rejected here and never reach the store.

mod error;
mod handlers;

pub use error::ApiError;

use crate::audit::{AuditEntry, AuditSink};
use crate::auth::{Authorizer, Operator};
use crate::command::CommandQueue;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tracing::warn;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub queue: CommandQueue,
    pub authorizer: Arc<dyn Authorizer>,
    pub audit: Arc<dyn AuditSink>,
}

impl AppState {
    pub fn new(
        queue: CommandQueue,
        authorizer: Arc<dyn Authorizer>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            queue,
            authorizer,
            audit,
        }
    }

    /// Authorize an operator, auditing a denial
    async fn authorize(&self, operator: &str, action: &str) -> Result<Operator, ApiError> {
        match self.authorizer.authorize(operator) {
            Ok(op) => Ok(op),
            Err(e) => {
                warn!(operator, action, error = %e, "Operator denied");
                self.audit
                    .record(AuditEntry::new(operator, "denied", action))
                    .await;
                Err(e.into())
            }
        }
    }
}

/// Create the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Operator
        .route("/door/unlock", post(handlers::unlock_door))
        .route("/door/lock", post(handlers::lock_door))
        // Actuator
        .route("/actuator/command", get(handlers::poll_command))
        .route("/actuator/confirm", post(handlers::confirm_command))
        .route("/actuator/debug", get(handlers::debug))
        .route("/actuator/test-command", post(handlers::test_command))
        .route("/actuator/status", post(handlers::status_report))
        .with_state(state)
}
