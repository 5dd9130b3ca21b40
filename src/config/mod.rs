mod file_config;

pub use file_config::{CatalogFileConfig, FileConfig, LoaderFileConfig, SearchFileConfig};

use crate::candidates::DEFAULT_LIMIT;

/// Published location of the BEQ catalogue document.
pub const DEFAULT_CATALOG_URL: &str =
    "https://beqcatalogue.readthedocs.io/en/latest/database.json";

/// Catalogue fetch timeout in seconds.
pub const DEFAULT_CATALOG_TIMEOUT_SEC: u64 = 15;

/// Catalogue cache lifetime: one week.
pub const DEFAULT_CATALOG_CACHE_TTL_SEC: u64 = 7 * 24 * 3600;

/// Profile loader request timeout in seconds.
pub const DEFAULT_LOADER_TIMEOUT_SEC: u64 = 30;

/// State-store key holding the TMDB id input value.
pub const DEFAULT_ID_SOURCE_KEY: &str = "sensor.beq_tmdb_ids";

/// State-store key holding the title-prefix input value.
pub const DEFAULT_TITLE_SOURCE_KEY: &str = "sensor.beq_titles";

/// Resolved bridge configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub catalog_url: String,
    pub catalog_timeout_sec: u64,
    pub catalog_cache_ttl_sec: u64,
    /// Candidate limit applied when a search does not pass one.
    pub default_limit: usize,
    pub id_source_key: String,
    pub title_source_key: String,
    /// Base URL of the BEQ device endpoint, when one is configured.
    pub loader_url: Option<String>,
    pub loader_timeout_sec: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            catalog_timeout_sec: DEFAULT_CATALOG_TIMEOUT_SEC,
            catalog_cache_ttl_sec: DEFAULT_CATALOG_CACHE_TTL_SEC,
            default_limit: DEFAULT_LIMIT,
            id_source_key: DEFAULT_ID_SOURCE_KEY.to_string(),
            title_source_key: DEFAULT_TITLE_SOURCE_KEY.to_string(),
            loader_url: None,
            loader_timeout_sec: DEFAULT_LOADER_TIMEOUT_SEC,
        }
    }
}

impl BridgeConfig {
    /// Resolve configuration from defaults and an optional TOML file config.
    /// File values override defaults where present.
    pub fn resolve(file_config: Option<FileConfig>) -> Self {
        let file = file_config.unwrap_or_default();
        let catalog = file.catalog.unwrap_or_default();
        let search = file.search.unwrap_or_default();
        let loader = file.loader.unwrap_or_default();

        Self {
            catalog_url: catalog
                .url
                .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string()),
            catalog_timeout_sec: catalog.timeout_sec.unwrap_or(DEFAULT_CATALOG_TIMEOUT_SEC),
            catalog_cache_ttl_sec: catalog
                .cache_ttl_sec
                .unwrap_or(DEFAULT_CATALOG_CACHE_TTL_SEC),
            default_limit: search.default_limit.unwrap_or(DEFAULT_LIMIT),
            id_source_key: search
                .id_source_key
                .unwrap_or_else(|| DEFAULT_ID_SOURCE_KEY.to_string()),
            title_source_key: search
                .title_source_key
                .unwrap_or_else(|| DEFAULT_TITLE_SOURCE_KEY.to_string()),
            loader_url: loader.url,
            loader_timeout_sec: loader.timeout_sec.unwrap_or(DEFAULT_LOADER_TIMEOUT_SEC),
        }
    }
}
