//! BEQ Bridge Library
//!
//! Finds audio-calibration (BEQ) profiles for a piece of media from loose
//! identifiers (TMDB ids or title prefixes), materializes them as selectable
//! candidates, and loads the chosen profile into an external BEQ device.

pub mod bridge;
pub mod candidates;
pub mod catalog;
pub mod config;
pub mod host;
pub mod inputs;
pub mod loader;
pub mod session;

// Re-export commonly used types for convenience
pub use bridge::{BridgeError, LoadParams, ProfileBridge, SearchOutcome, UnloadParams};
pub use candidates::{build_candidates, Candidate, DEFAULT_LIMIT};
pub use catalog::{CatalogFetcher, CatalogItem, HttpCatalogFetcher};
pub use config::BridgeConfig;
pub use host::{InMemoryStateStore, StateStore};
pub use loader::{HttpProfileLoader, LoadRequest, NoOpProfileLoader, ProfileLoader};
pub use session::{
    SessionSnapshot, Stage, StatusRecord, Subscription, SENTINEL_DISABLED, SENTINEL_NONE,
};
