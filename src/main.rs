use door_actuator::client::ServerClient;
use door_actuator::command::CommandExecutor;
use door_actuator::relay::{Relay, SimulatedRelay};
use door_actuator::{ActuatorConfig, Agent};
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = ActuatorConfig::from_env()?;

    info!("Door actuator starting: {}", config.device_id);
    info!("  server: {}", config.server_url);
    info!("  poll interval: {:?}", config.poll_interval);

    let relay: Arc<dyn Relay> = Arc::new(SimulatedRelay::new());
    info!("Relay driver: {}", relay.name());

    let client = ServerClient::new(&config)?;
    let executor = CommandExecutor::new(relay);

    Agent::new(config, client, executor).run().await;
    Ok(())
}
