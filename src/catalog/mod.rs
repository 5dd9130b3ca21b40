//! Remote BEQ catalogue access.
//!
//! The catalogue is a single JSON document listing every known release and
//! its calibration audio tracks. This module covers fetching it, coping with
//! its loose field types, and caching it for a week.

mod cache;
mod fetch;
mod models;

pub use cache::CatalogCache;
pub use fetch::{CatalogFetcher, HttpCatalogFetcher};
pub use models::{parse_catalog_document, CatalogItem};
