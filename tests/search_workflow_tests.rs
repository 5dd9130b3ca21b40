//! End-to-end search workflow tests: inputs → catalogue → candidates →
//! session replacement and status.

mod common;

use common::fixtures::{bridge_with, bridge_with_catalog, matrix_catalog};
use serde_json::json;

use beq_bridge::{BridgeError, BridgeConfig, SearchOutcome, Stage, StateStore, SENTINEL_NONE};

const CTX: &str = "entry-1";

#[tokio::test]
async fn test_id_search_expands_audio_tracks() {
    let t = bridge_with_catalog(matrix_catalog());
    t.store.set("sensor.beq_tmdb_ids", "603".to_string());

    let outcome = t.bridge.search(CTX, None).await.unwrap();
    assert_eq!(outcome, SearchOutcome::Ready { candidates: 2 });

    let snapshot = t.bridge.snapshot(CTX);
    assert_eq!(snapshot.candidates.len(), 2);
    assert!(snapshot.candidates[0].contains("Atmos"));
    assert!(snapshot.candidates[1].contains("5.1"));
    // Labels differ only in the audio-track segment.
    assert_eq!(
        snapshot.candidates[0].replace("Atmos", "#"),
        snapshot.candidates[1].replace("5.1", "#")
    );

    assert_eq!(snapshot.selected, snapshot.candidates[0]);
    assert_eq!(
        snapshot.status.stage,
        Stage::Ready {
            candidates: 2,
            selected: snapshot.candidates[0].clone(),
        }
    );
    let detail = snapshot.detail.unwrap();
    assert_eq!(detail.tmdb_id, "603");
    assert_eq!(detail.audio_type, "Atmos");
}

#[tokio::test]
async fn test_prefix_search_matches_in_catalog_order() {
    // Reloaded appears first in the catalogue, so it comes out first even
    // though it is the longer title.
    let t = bridge_with_catalog(json!([
        {"theMovieDB": "604", "title": "The Matrix Reloaded", "year": 2003},
        {"theMovieDB": "603", "title": "The Matrix", "year": 1999}
    ]));
    t.store.set("sensor.beq_titles", "The Matrix".to_string());

    let outcome = t.bridge.search(CTX, None).await.unwrap();
    assert_eq!(outcome, SearchOutcome::Ready { candidates: 2 });

    let snapshot = t.bridge.snapshot(CTX);
    assert!(snapshot.candidates[0].starts_with("The Matrix Reloaded"));
    assert!(snapshot.candidates[1].starts_with("The Matrix ("));
}

#[tokio::test]
async fn test_waiting_for_input_when_sources_missing() {
    let t = bridge_with_catalog(matrix_catalog());

    let outcome = t.bridge.search(CTX, None).await.unwrap();
    assert_eq!(outcome, SearchOutcome::WaitingForInput);

    let snapshot = t.bridge.snapshot(CTX);
    assert_eq!(snapshot.candidates, vec![SENTINEL_NONE.to_string()]);
    assert_eq!(snapshot.selected, SENTINEL_NONE);
    assert_eq!(
        snapshot.status.stage,
        Stage::WaitingForInput {
            id_source_found: false,
            title_source_found: false,
            id_count: 0,
            title_count: 0,
        }
    );
    // No catalogue fetch happens for an empty search.
    assert_eq!(t.fetcher.call_count(), 0);
}

#[tokio::test]
async fn test_waiting_for_input_reports_empty_but_present_sources() {
    let t = bridge_with_catalog(matrix_catalog());
    t.store.set("sensor.beq_tmdb_ids", "   ".to_string());

    t.bridge.search(CTX, None).await.unwrap();

    assert_eq!(
        t.bridge.snapshot(CTX).status.stage,
        Stage::WaitingForInput {
            id_source_found: true,
            title_source_found: false,
            id_count: 0,
            title_count: 0,
        }
    );
}

#[tokio::test]
async fn test_no_candidates_for_unmatched_inputs() {
    let t = bridge_with_catalog(matrix_catalog());
    t.store.set("sensor.beq_tmdb_ids", "99999".to_string());
    t.store.set("sensor.beq_titles", "Zardoz".to_string());

    let outcome = t.bridge.search(CTX, None).await.unwrap();
    assert_eq!(outcome, SearchOutcome::NoCandidates);

    let snapshot = t.bridge.snapshot(CTX);
    assert_eq!(snapshot.candidates, vec![SENTINEL_NONE.to_string()]);
    assert_eq!(
        snapshot.status.stage,
        Stage::NoCandidates {
            candidates: 0,
            id_count: 1,
            title_count: 1,
        }
    );
}

#[tokio::test]
async fn test_new_search_replaces_results_wholesale() {
    let t = bridge_with_catalog(matrix_catalog());
    t.store.set("sensor.beq_tmdb_ids", "603".to_string());
    t.bridge.search(CTX, None).await.unwrap();
    let old_label = t.bridge.snapshot(CTX).candidates[0].clone();

    t.store.set("sensor.beq_tmdb_ids", "604".to_string());
    t.bridge.search(CTX, None).await.unwrap();

    let snapshot = t.bridge.snapshot(CTX);
    assert_eq!(snapshot.candidates.len(), 1);
    assert!(snapshot.candidates[0].starts_with("The Matrix Reloaded"));

    // A label from the superseded search is no longer selectable.
    let err = t.bridge.select(CTX, Some(old_label.clone())).await.unwrap_err();
    match err {
        BridgeError::SelectionNotFound { label } => assert_eq!(label, old_label),
        other => panic!("expected SelectionNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_catalog_unavailable_without_cache_fails_loudly() {
    let t = bridge_with_catalog(matrix_catalog());
    t.fetcher.fail.store(true, std::sync::atomic::Ordering::SeqCst);
    t.store.set("sensor.beq_tmdb_ids", "603".to_string());

    let err = t.bridge.search(CTX, None).await.unwrap_err();
    assert!(matches!(err, BridgeError::CatalogUnavailable(_)));

    let snapshot = t.bridge.snapshot(CTX);
    assert_eq!(snapshot.status.stage, Stage::CatalogUnavailable);
    // Session state is untouched apart from the status.
    assert_eq!(snapshot.candidates, vec![SENTINEL_NONE.to_string()]);
}

#[tokio::test]
async fn test_catalog_unavailable_preserves_prior_results() {
    // Zero TTL forces a refetch on every search.
    let mut config = BridgeConfig::default();
    config.catalog_cache_ttl_sec = 0;
    let t = bridge_with(config, matrix_catalog());
    t.store.set("sensor.beq_tmdb_ids", "603".to_string());

    t.bridge.search(CTX, None).await.unwrap();
    let before = t.bridge.snapshot(CTX);

    t.fetcher.fail.store(true, std::sync::atomic::Ordering::SeqCst);
    let err = t.bridge.search(CTX, None).await.unwrap_err();
    assert!(matches!(err, BridgeError::CatalogUnavailable(_)));

    let after = t.bridge.snapshot(CTX);
    assert_eq!(after.status.stage, Stage::CatalogUnavailable);
    assert_eq!(after.candidates, before.candidates);
    assert_eq!(after.selected, before.selected);
}

#[tokio::test]
async fn test_second_search_uses_cached_catalog() {
    let t = bridge_with_catalog(matrix_catalog());
    t.store.set("sensor.beq_tmdb_ids", "603".to_string());

    t.bridge.search(CTX, None).await.unwrap();
    t.bridge.search(CTX, None).await.unwrap();

    assert_eq!(t.fetcher.call_count(), 1);
}

#[tokio::test]
async fn test_requested_limit_bounds_candidates() {
    let t = bridge_with_catalog(matrix_catalog());
    t.store.set("sensor.beq_tmdb_ids", "603".to_string());

    let outcome = t.bridge.search(CTX, Some(1)).await.unwrap();

    assert_eq!(outcome, SearchOutcome::Ready { candidates: 1 });
    assert_eq!(t.bridge.snapshot(CTX).candidates.len(), 1);
}

#[tokio::test]
async fn test_default_limit_is_ten() {
    let items: Vec<serde_json::Value> = (0..15)
        .map(|i| {
            json!({
                "theMovieDB": format!("{}", 1000 + i),
                "title": format!("Alien Part {}", i),
                "year": 1979 + i
            })
        })
        .collect();
    let t = bridge_with_catalog(serde_json::Value::Array(items));
    t.store.set("sensor.beq_titles", "Alien".to_string());

    let outcome = t.bridge.search(CTX, None).await.unwrap();

    assert_eq!(outcome, SearchOutcome::Ready { candidates: 10 });
}
