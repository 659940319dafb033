//! The unit of work held by the command store

use super::lifecycle::{self, LifecycleEvent, RecordState, Transition};
use doorlink_shared::{CommandId, CommandKind, Outcome, RecentCommand};

/// One actuation intent and its delivery state
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRecord {
    pub id: CommandId,
    /// Issuance counter, breaks ties between records created in the same millisecond
    pub seq: u64,
    pub kind: CommandKind,
    pub target: u32,
    /// Relay hold in milliseconds; only set for `activate`
    pub hold_duration: Option<u64>,
    pub created_at: u64,
    pub delivered: bool,
    pub outcome: Outcome,
    /// Last message reported by the actuator
    pub message: Option<String>,
}

impl CommandRecord {
    pub fn new(
        id: CommandId,
        seq: u64,
        kind: CommandKind,
        target: u32,
        hold_duration: Option<u64>,
        created_at: u64,
    ) -> Self {
        Self {
            id,
            seq,
            kind,
            target,
            hold_duration,
            created_at,
            delivered: false,
            outcome: Outcome::Pending,
            message: None,
        }
    }

    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.created_at)
    }

    /// Eligible to be handed to the actuator
    pub fn is_deliverable(&self, now_ms: u64, visibility_ms: u64) -> bool {
        !self.delivered && self.outcome == Outcome::Pending && self.age_ms(now_ms) < visibility_ms
    }

    /// Past the retention window
    pub fn is_expired(&self, now_ms: u64, retention_ms: u64) -> bool {
        self.age_ms(now_ms) >= retention_ms
    }

    pub fn state(&self) -> RecordState {
        match (self.outcome, self.delivered) {
            (Outcome::Failed, _) => RecordState::Failed,
            (_, true) => RecordState::Delivered,
            (_, false) => RecordState::Queued,
        }
    }

    /// Apply a lifecycle event, updating fields on a valid transition
    pub fn apply(&mut self, event: LifecycleEvent) -> Transition {
        let result = lifecycle::transition(self.state(), &event);

        match (&result, event) {
            (Transition::Moved(RecordState::Delivered), _) => self.delivered = true,
            (Transition::Moved(RecordState::Failed), LifecycleEvent::AckFailure(message)) => {
                self.outcome = Outcome::Failed;
                self.message = Some(message);
            }
            (Transition::Removed, LifecycleEvent::AckSuccess) => {
                self.outcome = Outcome::Confirmed;
            }
            _ => {}
        }

        result
    }

    pub fn to_recent(&self) -> RecentCommand {
        RecentCommand {
            id: self.id.clone(),
            kind: self.kind,
            target: self.target,
            created_at: self.created_at,
            delivered: self.delivered,
            outcome: self.outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(created_at: u64) -> CommandRecord {
        CommandRecord::new(
            CommandId::new(created_at, 1),
            1,
            CommandKind::Activate,
            1,
            Some(10_000),
            created_at,
        )
    }

    #[test]
    fn test_visibility_boundary() {
        let r = record(1_000);
        assert!(r.is_deliverable(1_000 + 59_999, 60_000));
        assert!(!r.is_deliverable(1_000 + 60_000, 60_000));
    }

    #[test]
    fn test_retention_boundary() {
        let r = record(1_000);
        assert!(!r.is_expired(1_000 + 299_999, 300_000));
        assert!(r.is_expired(1_000 + 300_000, 300_000));
    }

    #[test]
    fn test_clock_behind_creation_is_age_zero() {
        let r = record(5_000);
        assert_eq!(r.age_ms(1_000), 0);
        assert!(r.is_deliverable(1_000, 60_000));
    }

    #[test]
    fn test_apply_updates_fields() {
        let mut r = record(0);
        assert_eq!(r.apply(LifecycleEvent::Deliver), Transition::Moved(RecordState::Delivered));
        assert!(r.delivered);
        assert_eq!(r.outcome, Outcome::Pending);

        r.apply(LifecycleEvent::AckFailure("jammed".into()));
        assert_eq!(r.outcome, Outcome::Failed);
        assert_eq!(r.message.as_deref(), Some("jammed"));
        assert!(!r.is_deliverable(0, 60_000));
    }

    #[test]
    fn test_invalid_event_leaves_record_untouched() {
        let mut r = record(0);
        r.apply(LifecycleEvent::Deliver);
        let before = r.clone();
        assert!(matches!(r.apply(LifecycleEvent::Deliver), Transition::Invalid { .. }));
        assert_eq!(r, before);
    }
}
