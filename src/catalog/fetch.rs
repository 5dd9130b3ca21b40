//! HTTP fetch of the catalogue document.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Source of the raw catalogue document.
///
/// Abstracted so workflows can be driven without a network in tests.
#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    /// Fetch the full catalogue document as parsed JSON.
    async fn fetch_document(&self) -> Result<serde_json::Value>;
}

/// Fetches the catalogue from its published URL.
pub struct HttpCatalogFetcher {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalogFetcher {
    /// Create a new fetcher.
    ///
    /// # Arguments
    /// * `url` - Catalogue document URL
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(url: String, timeout_sec: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, url })
    }

    /// The catalogue URL this fetcher reads from.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CatalogFetcher for HttpCatalogFetcher {
    async fn fetch_document(&self) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Failed to connect to catalogue host")?;

        if !response.status().is_success() {
            anyhow::bail!("Catalogue fetch failed with status: {}", response.status());
        }

        response
            .json()
            .await
            .context("Failed to parse catalogue response")
    }
}
