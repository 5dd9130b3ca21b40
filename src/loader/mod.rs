//! Downstream profile-loading boundary.
//!
//! Loading a profile is an external operation: the bridge hands over a
//! structured request naming the destination state keys, the preferred
//! author, and the target slots; what the device does with it is opaque.
//! `HttpProfileLoader` talks to an ezbeq-style device endpoint, resolving
//! the destination keys through the host state store the same way the
//! device-side service would.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::host::StateStore;

/// Structured request for the external load/unload operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadRequest {
    pub tmdb_sensor: String,
    pub year_sensor: String,
    pub codec_sensor: String,
    pub edition_sensor: Option<String>,
    pub title_sensor: Option<String>,
    pub preferred_author: String,
    pub slots: Vec<u32>,
    pub enable_audio_codec_substitutions: bool,
    pub manual_load: bool,
}

impl LoadRequest {
    /// An unload request carries only slots; the remaining fields are part
    /// of the request shape but unused for unloading.
    pub fn unload_for_slots(slots: Vec<u32>) -> Self {
        Self {
            tmdb_sensor: String::new(),
            year_sensor: String::new(),
            codec_sensor: String::new(),
            edition_sensor: None,
            title_sensor: None,
            preferred_author: String::new(),
            slots,
            enable_audio_codec_substitutions: false,
            manual_load: false,
        }
    }
}

/// External profile-load operation.
#[async_trait]
pub trait ProfileLoader: Send + Sync {
    async fn load_profile(&self, request: &LoadRequest) -> Result<()>;
    async fn unload_profile(&self, request: &LoadRequest) -> Result<()>;
}

/// Loader that logs and succeeds. Used when no device endpoint is
/// configured, so searches and selections still work end to end.
pub struct NoOpProfileLoader;

#[async_trait]
impl ProfileLoader for NoOpProfileLoader {
    async fn load_profile(&self, request: &LoadRequest) -> Result<()> {
        debug!("No loader configured; dropping load request {:?}", request);
        Ok(())
    }

    async fn unload_profile(&self, request: &LoadRequest) -> Result<()> {
        debug!(
            "No loader configured; dropping unload request for slots {:?}",
            request.slots
        );
        Ok(())
    }
}

/// Wire payload for the device endpoint.
#[derive(Debug, Serialize)]
struct DeviceSearchRequest {
    tmdb: String,
    year: i32,
    codec: String,
    preferred_author: String,
    edition: String,
    title: String,
    slots: Vec<u32>,
}

/// HTTP client for an ezbeq-style BEQ device.
pub struct HttpProfileLoader {
    client: reqwest::Client,
    base_url: String,
    store: Arc<dyn StateStore>,
}

impl HttpProfileLoader {
    /// Create a new loader client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the device endpoint (e.g., "http://ezbeq.local:8080")
    /// * `timeout_sec` - Request timeout in seconds
    /// * `store` - Host state store used to resolve destination keys
    pub fn new(base_url: String, timeout_sec: u64, store: Arc<dyn StateStore>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .context("Failed to create HTTP client")?;

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            store,
        })
    }

    /// The device base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn state(&self, key: &str) -> Result<String> {
        self.store
            .get(key)
            .with_context(|| format!("Sensor {} not found", key))
    }

    fn optional_state(&self, key: &Option<String>) -> Result<String> {
        match key {
            Some(key) => self.state(key),
            None => Ok(String::new()),
        }
    }

    async fn post(&self, path: &str, payload: &DeviceSearchRequest) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .with_context(|| format!("Failed to connect to BEQ device at {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "BEQ device request failed: status={}, body={}",
                status,
                truncate(&body, 800)
            );
        }

        Ok(())
    }
}

#[async_trait]
impl ProfileLoader for HttpProfileLoader {
    async fn load_profile(&self, request: &LoadRequest) -> Result<()> {
        let year_raw = self.state(&request.year_sensor)?;
        let payload = DeviceSearchRequest {
            tmdb: self.state(&request.tmdb_sensor)?,
            year: year_raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid sensor data: year '{}'", year_raw))?,
            codec: self.state(&request.codec_sensor)?,
            preferred_author: request.preferred_author.clone(),
            edition: self.optional_state(&request.edition_sensor)?,
            title: self.optional_state(&request.title_sensor)?,
            slots: request.slots.clone(),
        };

        self.post("/profile/load", &payload).await?;
        info!("Loaded BEQ profile into slots {:?}", payload.slots);
        Ok(())
    }

    async fn unload_profile(&self, request: &LoadRequest) -> Result<()> {
        let payload = DeviceSearchRequest {
            tmdb: String::new(),
            year: 0,
            codec: String::new(),
            preferred_author: String::new(),
            edition: String::new(),
            title: String::new(),
            slots: request.slots.clone(),
        };

        self.post("/profile/unload", &payload).await?;
        info!("Unloaded BEQ profile from slots {:?}", payload.slots);
        Ok(())
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
