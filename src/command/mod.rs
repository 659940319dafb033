//! Command execution for the actuator agent
//!
//! This module handles:
//! - Turning poll responses into typed commands
//! - Dispatching to the activate/deactivate handlers
//! - Building the confirmation reported back to the server

mod executor;
pub mod handlers;

pub use executor::{ActuatorCommand, CommandExecutor, CommandResult};
