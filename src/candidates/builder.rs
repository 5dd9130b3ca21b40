//! Multi-source candidate matching.
//!
//! Two passes with fixed precedence: TMDB id matches first, then title-prefix
//! matches, each expanding an item into one candidate per audio-track type.
//! Deduplication is by candidate key, first occurrence wins.

use std::collections::HashSet;

use crate::catalog::CatalogItem;

use super::models::{candidate_key, Candidate};

/// How many candidates to expose when the caller does not say.
pub const DEFAULT_LIMIT: usize = 10;

/// Build the ordered candidate list for a set of identifiers.
///
/// Pure function of its inputs. Id matches always precede prefix matches;
/// within a pass, catalogue order is preserved; within one item, the order
/// of its audio-track-type list is preserved. The prefix pass re-scans the
/// full catalogue, so an item already matched by id is considered again and
/// dropped by key dedup rather than filtered up front. Returns at most
/// `limit` candidates.
///
/// Empty `ids` and `prefixes` yield an empty result; distinguishing "no
/// input" from "no matches" is the caller's job.
pub fn build_candidates(
    items: &[CatalogItem],
    ids: &[String],
    prefixes: &[String],
    limit: usize,
) -> Vec<Candidate> {
    let ids_norm: HashSet<&str> = ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .collect();
    let prefixes_norm: Vec<String> = prefixes
        .iter()
        .filter(|p| !p.trim().is_empty())
        .map(|p| normalize(p))
        .collect();

    let mut results: Vec<Candidate> = Vec::new();
    let mut seen_keys: HashSet<String> = HashSet::new();

    if !ids_norm.is_empty() {
        for item in items {
            if ids_norm.contains(item.tmdb_id.trim()) {
                expand_item(item, &mut results, &mut seen_keys);
            }
        }
    }

    if !prefixes_norm.is_empty() && results.len() < limit {
        for item in items {
            if results.len() >= limit {
                break;
            }
            if starts_with_any(&item.title, &prefixes_norm)
                || starts_with_any(&item.alt_title, &prefixes_norm)
            {
                expand_item(item, &mut results, &mut seen_keys);
            }
        }
    }

    results.truncate(limit);
    results
}

/// Expand one item into a candidate per audio-track type, skipping keys
/// already present. An item with no audio types yields a single candidate
/// with an empty type.
fn expand_item(item: &CatalogItem, results: &mut Vec<Candidate>, seen_keys: &mut HashSet<String>) {
    let empty_type = [String::new()];
    let audio_types: &[String] = if item.audio_types.is_empty() {
        &empty_type
    } else {
        &item.audio_types
    };

    for audio in audio_types {
        let key = candidate_key(item, audio);
        if !seen_keys.insert(key) {
            continue;
        }
        results.push(Candidate::from_item(item, audio));
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn starts_with_any(text: &str, normalized_prefixes: &[String]) -> bool {
    let text = normalize(text);
    normalized_prefixes.iter().any(|p| text.starts_with(p))
}
