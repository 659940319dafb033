//! Command dispatch and acknowledgment queue
//!
//! This module handles:
//! - Queuing operator actuation intents as command records
//! - Handing at most one command per poll to the actuator, in issue order
//! - Reconciling actuator success/failure reports
//! - Sweeping records that outlived their retention window

mod ack;
mod dispatcher;
mod error;
mod lifecycle;
mod poller;
mod queue;
mod reaper;
mod record;
mod store;

pub use ack::{AckHandler, AckOutcome};
pub use dispatcher::{Dispatcher, IssuedCommand};
pub use error::QueueError;
pub use lifecycle::{LifecycleEvent, RecordState, Transition};
pub use poller::{DeliveredCommand, PollerGateway};
pub use queue::{CommandQueue, QueueConfig};
pub use reaper::{Reaper, ReaperTask};
pub use record::CommandRecord;
pub use store::{CommandStore, Windows};
