//! Drone REST client
//!
//! Covers the three read endpoints triage needs. Requests are sent once;
//! any transport error or non-success status is returned to the caller.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;
use triage_core::LogLine;

use crate::config::DroneConfig;
use crate::error::{DroneError, Result};
use crate::model::{Build, WireLine};
use crate::source::BuildSource;

/// Drone API client for one repository.
pub struct DroneClient {
    config: DroneConfig,
    http_client: reqwest::Client,
}

impl DroneClient {
    /// Create a new Drone client
    pub fn new(config: DroneConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("ci-triage/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(DroneClient {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &DroneConfig {
        &self.config
    }

    fn builds_url(&self, page: u32, per_page: u32) -> String {
        format!(
            "{}/builds?page={}&per_page={}",
            self.config.repo_url(),
            page,
            per_page
        )
    }

    fn build_url(&self, number: u64) -> String {
        format!("{}/builds/{}", self.config.repo_url(), number)
    }

    fn logs_url(&self, build: u64, stage: u32, step: u32) -> String {
        format!(
            "{}/builds/{}/logs/{}/{}",
            self.config.repo_url(),
            build,
            stage,
            step
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url, "GET");

        let mut request = self.http_client.get(url);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DroneError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl BuildSource for DroneClient {
    async fn list_builds(&self, page: u32, per_page: u32) -> Result<Vec<Build>> {
        self.get_json(&self.builds_url(page, per_page)).await
    }

    async fn build(&self, number: u64) -> Result<Build> {
        self.get_json(&self.build_url(number)).await
    }

    async fn logs(&self, build: u64, stage: u32, step: u32) -> Result<Vec<LogLine>> {
        let wire: Vec<WireLine> = self.get_json(&self.logs_url(build, stage, step)).await?;
        Ok(WireLine::into_log_lines(wire))
    }
}
