//! HTTP client for the command queue server

use crate::config::ActuatorConfig;
use anyhow::{Context, Result};
use doorlink_shared::{ConfirmRequest, ConfirmResponse, PollResponse, StatusReport};

/// Short-poll client; every call is a single non-blocking request
#[derive(Debug, Clone)]
pub struct ServerClient {
    http: reqwest::Client,
    base_url: String,
}

impl ServerClient {
    pub fn new(config: &ActuatorConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.server_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /actuator/command`
    pub async fn poll(&self) -> Result<PollResponse> {
        let resp = self
            .http
            .get(self.url("/actuator/command"))
            .send()
            .await?
            .error_for_status()?
            .json::<PollResponse>()
            .await?;
        Ok(resp)
    }

    /// `POST /actuator/confirm`
    pub async fn confirm(&self, confirm: &ConfirmRequest) -> Result<ConfirmResponse> {
        let resp = self
            .http
            .post(self.url("/actuator/confirm"))
            .json(confirm)
            .send()
            .await?
            .error_for_status()?
            .json::<ConfirmResponse>()
            .await?;
        Ok(resp)
    }

    /// `POST /actuator/status`
    pub async fn report_status(&self, report: &StatusReport) -> Result<()> {
        self.http
            .post(self.url("/actuator/status"))
            .json(report)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
