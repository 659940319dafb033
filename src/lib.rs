//! Door actuator agent
//!
//! Runs next to the relay. It cannot accept inbound connections, so it
//! short-polls the doorlink server for work and reports each outcome.

pub mod agent;
pub mod client;
pub mod command;
pub mod config;
pub mod relay;

pub use agent::Agent;
pub use config::ActuatorConfig;
