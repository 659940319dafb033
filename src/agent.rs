//! Short-poll loop tying the server client to the relay executor

use crate::client::ServerClient;
use crate::command::{ActuatorCommand, CommandExecutor};
use crate::config::ActuatorConfig;
use anyhow::{Context, Result};
use doorlink_shared::{ConfirmRequest, StatusReport};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

pub struct Agent {
    config: ActuatorConfig,
    client: ServerClient,
    executor: CommandExecutor,
}

impl Agent {
    pub fn new(config: ActuatorConfig, client: ServerClient, executor: CommandExecutor) -> Self {
        Self {
            config,
            client,
            executor,
        }
    }

    /// Poll once; executes and confirms a command if one was waiting
    pub async fn poll_once(&self) -> Result<Option<ConfirmRequest>> {
        let resp = self.client.poll().await.context("Poll failed")?;

        let Some(command) = ActuatorCommand::from_poll(resp) else {
            debug!("No command");
            return Ok(None);
        };

        let confirm = self.executor.execute(&command).await;
        let ack = self
            .client
            .confirm(&confirm)
            .await
            .with_context(|| format!("Failed to confirm command {}", command.id))?;

        if !ack.acknowledged {
            warn!("Server did not acknowledge command {}", command.id);
        }

        Ok(Some(confirm))
    }

    /// Announce ourselves and poll forever
    pub async fn run(&self) {
        let report = StatusReport {
            status: "online".into(),
            message: format!("{} started", self.config.device_id),
            ip_address: String::new(),
        };
        if let Err(e) = self.client.report_status(&report).await {
            warn!("Status report failed: {:#}", e);
        }

        let mut ticker = interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match self.poll_once().await {
                Ok(Some(confirm)) => {
                    info!(
                        "Command {} reported (success={})",
                        confirm.command_id, confirm.success
                    );
                }
                Ok(None) => {}
                // Transport errors are retried on the next tick
                Err(e) => error!("{:#}", e),
            }
        }
    }
}
