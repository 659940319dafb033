//! Command Record Lifecycle
//!
//! Defines the valid state transitions of a queued command.

/// Where a record sits in its delivery lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// Pending and not yet handed to the actuator
    Queued,
    /// Pending and handed to the actuator, awaiting its report
    Delivered,
    /// Actuator reported failure; kept only for diagnostics
    Failed,
}

/// Events that can move a record through its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Poller handed the record to the actuator
    Deliver,
    /// Actuator reported success
    AckSuccess,
    /// Actuator reported failure with a message
    AckFailure(String),
    /// Record aged out of the retention window
    Expire,
}

/// Result of applying an event to a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Record stays in the store in the given state
    Moved(RecordState),
    /// Record must be removed from the store
    Removed,
    /// Event is not valid from the current state; nothing changed
    Invalid {
        from: RecordState,
        event: LifecycleEvent,
    },
}

/// Compute the transition for `event` from `from`
pub fn transition(from: RecordState, event: &LifecycleEvent) -> Transition {
    use LifecycleEvent::*;
    use RecordState::*;

    match (from, event) {
        // Expiry and confirmation always retire the record
        (_, Expire) => Transition::Removed,
        (_, AckSuccess) => Transition::Removed,

        (Queued, Deliver) => Transition::Moved(Delivered),

        // A failure is terminal; repeated failure reports keep it failed
        (Queued | Delivered | Failed, AckFailure(_)) => Transition::Moved(Failed),

        // Delivered and failed records are never handed out again
        (Delivered | Failed, Deliver) => Transition::Invalid {
            from,
            event: event.clone(),
        },
    }
}
