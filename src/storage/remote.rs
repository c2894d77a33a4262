use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::models::AppData;
use crate::storage::Storage;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct SaveResponse {
    #[serde(default)]
    success: bool,
}

/// Client for the persistence server's `/api/data` endpoint.
pub struct RemoteStore {
    client: Client,
    base_url: String,
}

impl RemoteStore {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn data_url(&self) -> String {
        format!("{}/api/data", self.base_url)
    }
}

#[async_trait]
impl Storage for RemoteStore {
    async fn load(&mut self) -> Result<AppData> {
        let url = self.data_url();
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Data server error {}: {}", status, body);
        }

        let data: AppData = resp.json().await.context("Failed to parse stored data")?;
        debug!("Fetched {} days from {}", data.days.len(), url);
        Ok(data)
    }

    async fn save(&mut self, data: &AppData) -> Result<()> {
        let url = self.data_url();
        let resp = self
            .client
            .post(&url)
            .json(data)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Data server error {}: {}", status, body);
        }

        let ack: SaveResponse = resp.json().await.context("Failed to parse save response")?;
        if !ack.success {
            anyhow::bail!("Data server did not acknowledge the save");
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("remote store {}", self.base_url)
    }
}
