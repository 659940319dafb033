//! Doorlink command queue server
//!
//! Operators queue door actuation commands; the actuator short-polls for
//! them and reports back. All state lives in memory.

pub mod api;
pub mod audit;
pub mod auth;
pub mod command;
pub mod config;

pub use api::{router, AppState};
pub use command::CommandQueue;
pub use config::ServerConfig;
