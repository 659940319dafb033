use doorlink_server::audit::TracingAuditSink;
use doorlink_server::auth::StaticAuthorizer;
use doorlink_server::{router, AppState, CommandQueue, ServerConfig};
use doorlink_shared::SystemClock;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = ServerConfig::from_env()?;

    let authorizer = StaticAuthorizer::new(config.operators.clone());
    if authorizer.is_open() {
        warn!("No operators configured, accepting any operator name");
    }

    let queue = CommandQueue::new(config.queue, Arc::new(SystemClock));
    let _reaper = config.sweep_interval.map(|every| {
        info!("Background sweep every {:?}", every);
        queue.spawn_reaper(every)
    });

    let state = AppState::new(queue, Arc::new(authorizer), Arc::new(TracingAuditSink));

    let listener = TcpListener::bind(config.bind).await?;
    info!("Doorlink server listening on {}", config.bind);
    info!(
        "  relay target={} visibility={}ms retention={}ms",
        config.queue.target,
        config.queue.windows.visibility_ms,
        config.queue.windows.retention_ms
    );

    axum::serve(listener, router(state)).await?;
    Ok(())
}
