//! Single-attempt HTTP fetch of a job posting page

use crate::config::ScrapingConfig;
use crate::error::{JobLensError, Result};
use log::info;
use reqwest::Client;
use std::time::Duration;

pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(config: &ScrapingConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| JobLensError::Fetch(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Fetch the page body. One attempt, no retry; timeouts, transport
    /// errors, and non-2xx statuses all surface as fetch failures.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        info!("Fetching job posting: {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(JobLensError::Fetch(format!(
                "HTTP error fetching {}: {}",
                url,
                response.status()
            )));
        }

        let body = response.text().await?;
        Ok(body)
    }
}
