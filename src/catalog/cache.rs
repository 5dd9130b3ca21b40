//! Time-based cache of the fetched catalogue.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::fetch::CatalogFetcher;
use super::models::{parse_catalog_document, CatalogItem};

/// A fetched item list and when it was fetched.
struct CacheEntry {
    items: Arc<Vec<CatalogItem>>,
    fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.fetched_at < ttl
    }
}

/// Caches the catalogue item list for a fixed TTL.
///
/// The entry is guarded by an async mutex: concurrent `get_items` calls in
/// one context serialize, and the entry + timestamp are replaced together.
/// A failed refetch never yields an empty list; the caller gets the error
/// and any expired entry stays in place for the next attempt to replace.
pub struct CatalogCache {
    fetcher: Arc<dyn CatalogFetcher>,
    ttl: Duration,
    entry: tokio::sync::Mutex<Option<CacheEntry>>,
}

impl CatalogCache {
    pub fn new(fetcher: Arc<dyn CatalogFetcher>, ttl_sec: u64) -> Self {
        Self {
            fetcher,
            ttl: Duration::seconds(ttl_sec as i64),
            entry: tokio::sync::Mutex::new(None),
        }
    }

    /// Return the cached item list, refetching when expired or absent.
    pub async fn get_items(&self) -> Result<Arc<Vec<CatalogItem>>> {
        let mut entry = self.entry.lock().await;
        let now = Utc::now();

        if let Some(cached) = entry.as_ref() {
            if cached.is_fresh(now, self.ttl) {
                debug!("Using cached catalogue ({} items)", cached.items.len());
                return Ok(cached.items.clone());
            }
        }

        let document = match self.fetcher.fetch_document().await {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Could not fetch BEQ catalogue: {:#}", e);
                return Err(e).context("Catalogue fetch failed");
            }
        };

        let items = Arc::new(parse_catalog_document(document)?);
        info!("Fetched BEQ catalogue: {} items", items.len());

        *entry = Some(CacheEntry {
            items: items.clone(),
            fetched_at: now,
        });

        Ok(items)
    }
}
