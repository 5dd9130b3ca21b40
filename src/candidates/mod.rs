//! Candidate derivation from catalogue records.
//!
//! A candidate is one selectable (release, audio-track-type) pairing. The
//! builder matches catalogue items against TMDB ids and title prefixes and
//! produces a deduplicated, limit-bounded, ordered candidate list.

mod builder;
mod models;

pub use builder::{build_candidates, DEFAULT_LIMIT};
pub use models::Candidate;
