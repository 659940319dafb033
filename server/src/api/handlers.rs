//! Request handlers

use super::{ApiError, AppState};
use crate::audit::AuditEntry;
use crate::command::{AckOutcome, CommandQueue, IssuedCommand, QueueError};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use doorlink_shared::{
    now_ms, ConfirmRequest, ConfirmResponse, DiagnosticsResponse, HealthResponse, IssueRequest,
    IssueResponse, PollResponse, StatusAck, StatusReport,
};
use tracing::{error, info};

/// Identity used when auditing actuator reports
const ACTUATOR_OPERATOR: &str = "actuator";

/// Operator actions that queue a command
#[derive(Debug, Clone, Copy)]
enum DoorAction {
    Unlock { hold_duration: Option<u64> },
    Lock,
    TestPulse,
}

impl DoorAction {
    fn label(&self) -> &'static str {
        match self {
            DoorAction::Unlock { .. } => "Unlocked",
            DoorAction::Lock => "Locked",
            DoorAction::TestPulse => "Test pulse",
        }
    }

    async fn queue(&self, queue: &CommandQueue) -> Result<IssuedCommand, QueueError> {
        match *self {
            DoorAction::Unlock { hold_duration } => queue.issue_unlock(hold_duration).await,
            DoorAction::Lock => queue.issue_lock().await,
            DoorAction::TestPulse => queue.issue_test_pulse().await,
        }
    }
}

async fn issue(
    state: &AppState,
    operator: &str,
    action: DoorAction,
) -> Result<IssueResponse, ApiError> {
    let label = action.label();
    let op = state.authorize(operator, label).await?;

    if matches!(action, DoorAction::TestPulse) {
        if let Err(e) = op.require_admin() {
            state
                .audit
                .record(AuditEntry::new(&op.name, "denied", label))
                .await;
            return Err(e.into());
        }
    }

    info!(operator = %op.name, role = %op.role, action = label, "Door request");

    match action.queue(&state.queue).await {
        Ok(issued) => {
            state
                .audit
                .record(AuditEntry::new(&op.name, "success", label))
                .await;
            Ok(IssueResponse {
                command_id: issued.id,
                target: issued.target,
                hold_duration: issued.hold_duration,
            })
        }
        Err(e) => {
            error!(operator = %op.name, action = label, error = %e, "Failed to queue command");
            state
                .audit
                .record(AuditEntry::new(&op.name, "failed", label))
                .await;
            Err(e.into())
        }
    }
}

/// `POST /door/unlock`
pub async fn unlock_door(
    State(state): State<AppState>,
    payload: Result<Json<IssueRequest>, JsonRejection>,
) -> Result<Json<IssueResponse>, ApiError> {
    let Json(req) = payload?;
    let action = DoorAction::Unlock {
        hold_duration: req.hold_duration,
    };
    issue(&state, &req.operator, action).await.map(Json)
}

/// `POST /door/lock`
pub async fn lock_door(
    State(state): State<AppState>,
    payload: Result<Json<IssueRequest>, JsonRejection>,
) -> Result<Json<IssueResponse>, ApiError> {
    let Json(req) = payload?;
    issue(&state, &req.operator, DoorAction::Lock).await.map(Json)
}

/// `POST /actuator/test-command`
pub async fn test_command(
    State(state): State<AppState>,
    payload: Result<Json<IssueRequest>, JsonRejection>,
) -> Result<Json<IssueResponse>, ApiError> {
    let Json(req) = payload?;
    issue(&state, &req.operator, DoorAction::TestPulse)
        .await
        .map(Json)
}

/// `GET /actuator/command`
pub async fn poll_command(State(state): State<AppState>) -> Json<PollResponse> {
    let response = state
        .queue
        .poll()
        .await
        .map(PollResponse::from)
        .unwrap_or_else(PollResponse::empty);
    Json(response)
}

/// `POST /actuator/confirm`
///
/// Always acknowledges; reports for unknown or expired ids are a no-op.
pub async fn confirm_command(
    State(state): State<AppState>,
    payload: Result<Json<ConfirmRequest>, JsonRejection>,
) -> Result<Json<ConfirmResponse>, ApiError> {
    let Json(req) = payload?;

    let outcome = state
        .queue
        .acknowledge(&req.command_id, req.success, &req.message)
        .await;

    let entry = match &outcome {
        AckOutcome::Confirmed(record) => {
            AuditEntry::new(ACTUATOR_OPERATOR, "success", format!("Confirm {}", record.kind))
        }
        AckOutcome::Failed(record) => {
            AuditEntry::new(ACTUATOR_OPERATOR, "failed", format!("Confirm {}", record.kind))
        }
        AckOutcome::Unknown => AuditEntry::new(
            ACTUATOR_OPERATOR,
            "unknown",
            format!("Confirm {}", req.command_id),
        ),
    };
    state.audit.record(entry).await;

    Ok(Json(ConfirmResponse { acknowledged: true }))
}

/// `GET /actuator/debug`
pub async fn debug(State(state): State<AppState>) -> Json<DiagnosticsResponse> {
    Json(state.queue.diagnostics().await)
}

/// `POST /actuator/status`
pub async fn status_report(
    payload: Result<Json<StatusReport>, JsonRejection>,
) -> Result<Json<StatusAck>, ApiError> {
    let Json(report) = payload?;
    info!(
        status = %report.status,
        report = %report.message,
        ip_address = %report.ip_address,
        "Actuator status update"
    );
    Ok(Json(StatusAck { received: true }))
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        timestamp_ms: now_ms(),
    })
}

#[cfg(test)]
mod tests {
    use crate::api::{router, AppState};
    use crate::audit::MemoryAuditSink;
    use crate::auth::{Role, StaticAuthorizer};
    use crate::command::{CommandQueue, QueueConfig};
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use doorlink_shared::{
        CommandKind, DiagnosticsResponse, IssueResponse, ManualClock, PollResponse,
    };
    use serde::de::DeserializeOwned;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct Harness {
        app: Router,
        clock: ManualClock,
        audit: MemoryAuditSink,
    }

    fn harness() -> Harness {
        let clock = ManualClock::new(1_700_000_000_000);
        let audit = MemoryAuditSink::new();
        let authorizer = StaticAuthorizer::new([
            ("alice".to_string(), Role::User),
            ("bob".to_string(), Role::User),
            ("admin".to_string(), Role::Admin),
        ]);
        let state = AppState::new(
            CommandQueue::new(QueueConfig::default(), Arc::new(clock.clone())),
            Arc::new(authorizer),
            Arc::new(audit.clone()),
        );
        Harness {
            app: router(state),
            clock,
            audit,
        }
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn parse<T: DeserializeOwned>(value: Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_unlock_poll_confirm_flow() {
        let h = harness();

        let (status, body) = call(
            &h.app,
            Method::POST,
            "/door/unlock",
            Some(json!({"operator": "alice"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let issued: IssueResponse = parse(body);
        assert_eq!(issued.target, 1);
        assert_eq!(issued.hold_duration, Some(10_000));

        let (_, body) = call(&h.app, Method::GET, "/actuator/command", None).await;
        let poll: PollResponse = parse(body);
        assert!(poll.has_command);
        assert_eq!(poll.command_id.as_ref(), Some(&issued.command_id));
        assert_eq!(poll.kind, Some(CommandKind::Activate));
        assert_eq!(poll.target, Some(1));
        assert_eq!(poll.hold_duration, Some(10_000));

        let (_, body) = call(&h.app, Method::GET, "/actuator/command", None).await;
        assert_eq!(body, json!({"has_command": false}));

        let (status, body) = call(
            &h.app,
            Method::POST,
            "/actuator/confirm",
            Some(json!({"command_id": issued.command_id, "success": true, "message": "opened"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"acknowledged": true}));

        let (_, body) = call(&h.app, Method::GET, "/actuator/debug", None).await;
        let diag: DiagnosticsResponse = parse(body);
        assert_eq!(diag.pending_count, 0);

        let audit = h.audit.entries().await;
        assert_eq!(audit.len(), 2);
        assert_eq!(audit[0].operator, "alice");
        assert_eq!(audit[0].action, "Unlocked");
        assert_eq!(audit[1].action, "Confirm activate");
        assert_eq!(audit[1].outcome, "success");
    }

    #[tokio::test]
    async fn test_lock_expires_without_poll() {
        let h = harness();

        let (status, body) = call(
            &h.app,
            Method::POST,
            "/door/lock",
            Some(json!({"operator": "bob"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("hold_duration").is_none());

        h.clock.advance(61_000);
        let (_, body) = call(&h.app, Method::GET, "/actuator/command", None).await;
        assert_eq!(body["has_command"], false);

        let (_, body) = call(&h.app, Method::GET, "/actuator/debug", None).await;
        let diag: DiagnosticsResponse = parse(body);
        assert_eq!(diag.pending_count, 1);
        assert!(diag.active_ids.is_empty());
    }

    #[tokio::test]
    async fn test_confirm_unknown_id_is_noop() {
        let h = harness();
        call(&h.app, Method::POST, "/door/lock", Some(json!({"operator": "bob"}))).await;

        let (status, body) = call(
            &h.app,
            Method::POST,
            "/actuator/confirm",
            Some(json!({"command_id": "nonexistent-id", "success": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["acknowledged"], true);

        let (_, body) = call(&h.app, Method::GET, "/actuator/debug", None).await;
        assert_eq!(body["pending_count"], 1);
    }

    #[tokio::test]
    async fn test_failed_confirm_listed_in_debug() {
        let h = harness();
        let (_, body) = call(
            &h.app,
            Method::POST,
            "/door/unlock",
            Some(json!({"operator": "alice"})),
        )
        .await;
        let issued: IssueResponse = parse(body);
        call(&h.app, Method::GET, "/actuator/command", None).await;

        call(
            &h.app,
            Method::POST,
            "/actuator/confirm",
            Some(json!({
                "command_id": issued.command_id,
                "success": false,
                "message": "relay stuck"
            })),
        )
        .await;

        let (_, body) = call(&h.app, Method::GET, "/actuator/debug", None).await;
        assert_eq!(body["pending_count"], 1);
        assert_eq!(body["recent"][0]["id"], json!(issued.command_id));
        assert_eq!(body["recent"][0]["outcome"], "failed");
        assert_eq!(body["recent"][0]["delivered"], true);
    }

    #[tokio::test]
    async fn test_unknown_operator_forbidden() {
        let h = harness();
        let (status, body) = call(
            &h.app,
            Method::POST,
            "/door/unlock",
            Some(json!({"operator": "mallory"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN");

        let (_, body) = call(&h.app, Method::GET, "/actuator/debug", None).await;
        assert_eq!(body["pending_count"], 0);

        let audit = h.audit.entries().await;
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].outcome, "denied");
    }

    #[tokio::test]
    async fn test_malformed_payload_rejected() {
        let h = harness();

        let (status, body) = call(
            &h.app,
            Method::POST,
            "/door/unlock",
            Some(json!({"user": "alice"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");

        let (status, _) = call(
            &h.app,
            Method::POST,
            "/actuator/confirm",
            Some(json!({"command_id": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = call(&h.app, Method::GET, "/actuator/debug", None).await;
        assert_eq!(body["pending_count"], 0);
    }

    #[tokio::test]
    async fn test_test_pulse_requires_admin() {
        let h = harness();

        let (status, _) = call(
            &h.app,
            Method::POST,
            "/actuator/test-command",
            Some(json!({"operator": "alice"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call(
            &h.app,
            Method::POST,
            "/actuator/test-command",
            Some(json!({"operator": "admin"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hold_duration"], 5_000);
    }

    #[tokio::test]
    async fn test_unlock_hold_override() {
        let h = harness();
        let (_, body) = call(
            &h.app,
            Method::POST,
            "/door/unlock",
            Some(json!({"operator": "alice", "hold_duration": 3000})),
        )
        .await;
        assert_eq!(body["hold_duration"], 3_000);
    }

    #[tokio::test]
    async fn test_status_and_health() {
        let h = harness();

        let (status, body) = call(
            &h.app,
            Method::POST,
            "/actuator/status",
            Some(json!({"status": "online", "ip_address": "192.168.1.40"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["received"], true);

        let (status, body) = call(&h.app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
