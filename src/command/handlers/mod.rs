//! Command handlers for the relay actions

mod activate;
mod deactivate;

pub use activate::handle_activate;
pub use deactivate::handle_deactivate;

use crate::relay::Relay;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Context passed to command handlers
#[derive(Clone)]
pub struct HandlerContext {
    pub relay: Arc<dyn Relay>,
    pub target: u32,
    /// Activation counter per channel; a pending auto-release only fires if
    /// no newer activation happened in the meantime
    pub generations: Arc<Mutex<HashMap<u32, u64>>>,
}
