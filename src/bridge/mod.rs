//! Workflow orchestration.
//!
//! `ProfileBridge` drives the whole candidate lifecycle per context: search
//! (inputs → catalogue → candidates → session replacement), selection,
//! profile load/unload, and the enable gate. Every workflow checks the gate
//! first, and every failure path writes a status record before surfacing
//! the failure, so observers never see a failure without a matching status.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::candidates::build_candidates;
use crate::catalog::{CatalogCache, CatalogFetcher};
use crate::config::BridgeConfig;
use crate::host::StateStore;
use crate::inputs::parse_values;
use crate::loader::{LoadRequest, ProfileLoader};
use crate::session::{
    SessionHandle, SessionRegistry, SessionSnapshot, Stage, StatusRecord, Subscription,
    SENTINEL_DISABLED, SENTINEL_NONE,
};

/// Failures surfaced to the invoking caller.
///
/// "No input" and "no matches" are not failures; they are recorded only as
/// status stages and reported through [`SearchOutcome`].
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Catalogue unavailable; cannot search: {0}")]
    CatalogUnavailable(#[source] anyhow::Error),

    #[error("Candidate '{label}' not found in last results")]
    SelectionNotFound { label: String },

    #[error("{reason}")]
    PreconditionFailed { reason: String },

    #[error("Failed to {operation} BEQ profile: {source}")]
    Downstream {
        operation: &'static str,
        source: anyhow::Error,
    },
}

/// How a search invocation ended. All four are successful invocations; the
/// stage taxonomy carries the detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Disabled,
    WaitingForInput,
    NoCandidates,
    Ready { candidates: usize },
}

/// Parameters of a load trigger. The three destination keys are mandatory;
/// missing ones fail the invocation naming exactly which are absent.
#[derive(Debug, Clone, Default)]
pub struct LoadParams {
    pub tmdb_sensor: Option<String>,
    pub year_sensor: Option<String>,
    pub codec_sensor: Option<String>,
    pub edition_sensor: Option<String>,
    pub title_sensor: Option<String>,
    pub slots: Option<Vec<u32>>,
    pub enable_audio_codec_substitutions: bool,
}

/// Parameters of an unload trigger.
#[derive(Debug, Clone, Default)]
pub struct UnloadParams {
    pub slots: Option<Vec<u32>>,
}

fn default_slots() -> Vec<u32> {
    vec![1]
}

/// Orchestrates candidate search, selection, and profile loading across
/// per-context sessions.
pub struct ProfileBridge {
    config: BridgeConfig,
    store: Arc<dyn StateStore>,
    loader: Arc<dyn ProfileLoader>,
    fetcher: Arc<dyn CatalogFetcher>,
    sessions: SessionRegistry,
}

impl ProfileBridge {
    pub fn new(
        config: BridgeConfig,
        store: Arc<dyn StateStore>,
        loader: Arc<dyn ProfileLoader>,
        fetcher: Arc<dyn CatalogFetcher>,
    ) -> Self {
        Self {
            config,
            store,
            loader,
            fetcher,
            sessions: SessionRegistry::new(),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    fn session(&self, context_id: &str) -> Arc<SessionHandle> {
        self.sessions.get_or_create(context_id, || {
            CatalogCache::new(self.fetcher.clone(), self.config.catalog_cache_ttl_sec)
        })
    }

    /// Latest published state of a context's session.
    pub fn snapshot(&self, context_id: &str) -> SessionSnapshot {
        self.session(context_id).snapshot()
    }

    /// Register a change observer for a context. Callbacks fire
    /// synchronously after every candidate/selection replacement, with no
    /// payload; take a [`snapshot`](Self::snapshot) to see the new state.
    pub fn subscribe(
        &self,
        context_id: &str,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> Subscription {
        self.session(context_id).subscribe(callback)
    }

    pub fn is_search_enabled(&self, context_id: &str) -> bool {
        self.session(context_id).snapshot().search_enabled
    }

    /// Flip the enable gate. Turning it off synchronously clears the
    /// session to the "disabled" sentinels and publishes; no workflow can
    /// observe a stale non-sentinel state while the gate is off.
    pub async fn set_search_enabled(&self, context_id: &str, enabled: bool) {
        let handle = self.session(context_id);
        let mut core = handle.core.lock().await;

        if core.search_enabled == enabled {
            return;
        }
        core.search_enabled = enabled;

        if enabled {
            info!("Search enabled in context '{}'", context_id);
            handle.commit(&core, false);
        } else {
            info!("Search disabled in context '{}'; clearing session", context_id);
            core.clear_to_disabled();
            core.status = StatusRecord::new(Stage::Disabled, "Search toggle is off");
            handle.commit(&core, true);
        }
    }

    /// Run a candidate search for a context.
    ///
    /// Reads the two identifier inputs from the state store, consults the
    /// catalogue cache, and replaces the session's candidate list and
    /// lookup wholesale.
    pub async fn search(
        &self,
        context_id: &str,
        limit: Option<usize>,
    ) -> Result<SearchOutcome, BridgeError> {
        let handle = self.session(context_id);
        let mut core = handle.core.lock().await;

        if !core.search_enabled {
            core.clear_to_disabled();
            core.status = StatusRecord::new(Stage::Disabled, "Search toggle is off");
            handle.commit(&core, true);
            return Ok(SearchOutcome::Disabled);
        }

        let id_raw = self.store.get(&self.config.id_source_key);
        let title_raw = self.store.get(&self.config.title_source_key);
        let id_source_found = id_raw.is_some();
        let title_source_found = title_raw.is_some();
        let ids = parse_values(id_raw.as_deref());
        let titles = parse_values(title_raw.as_deref());

        if ids.is_empty() && titles.is_empty() {
            core.status = StatusRecord::new(
                Stage::WaitingForInput {
                    id_source_found,
                    title_source_found,
                    id_count: 0,
                    title_count: 0,
                },
                "No TMDB ids or titles provided",
            );
            core.reset_to_none();
            handle.commit(&core, true);
            return Ok(SearchOutcome::WaitingForInput);
        }

        // Visible intermediate status while the catalogue is consulted.
        core.status = StatusRecord::new(
            Stage::Searching {
                id_source_found,
                title_source_found,
                id_count: ids.len(),
                title_count: titles.len(),
            },
            "Running candidate search",
        );
        handle.commit(&core, false);

        let items = match handle.cache.get_items().await {
            Ok(items) => items,
            Err(e) => {
                core.status =
                    StatusRecord::new(Stage::CatalogUnavailable, "Failed to fetch BEQ catalogue");
                handle.commit(&core, false);
                return Err(BridgeError::CatalogUnavailable(e));
            }
        };

        let limit = limit.unwrap_or(self.config.default_limit);
        let built = build_candidates(&items, &ids, &titles, limit);
        debug!(
            "Search in context '{}' matched {} candidates (ids={}, titles={})",
            context_id,
            built.len(),
            ids.len(),
            titles.len()
        );

        // The lookup always reflects the latest search, even an empty one.
        core.lookup = built.iter().map(|c| (c.key.clone(), c.clone())).collect();

        if built.is_empty() {
            core.reset_to_none();
            handle.commit(&core, true);
            core.status = StatusRecord::new(
                Stage::NoCandidates {
                    candidates: 0,
                    id_count: ids.len(),
                    title_count: titles.len(),
                },
                "No matches for provided TMDB ids or title prefixes",
            );
            handle.commit(&core, false);
            return Ok(SearchOutcome::NoCandidates);
        }

        let labels: Vec<String> = built.iter().map(|c| c.label.clone()).collect();
        let selected = labels[0].clone();
        core.candidates = labels;
        core.selected = selected.clone();
        core.detail = Some(built[0].clone());
        handle.commit(&core, true);

        core.status = StatusRecord::new(
            Stage::Ready {
                candidates: built.len(),
                selected: selected.clone(),
            },
            "Candidates available",
        );
        handle.commit(&core, false);
        info!(
            "Search ready in context '{}': {} candidates, selected '{}'",
            context_id,
            built.len(),
            selected
        );

        Ok(SearchOutcome::Ready {
            candidates: built.len(),
        })
    }

    /// Apply a selection from the latest search's candidates.
    ///
    /// With no explicit label, re-affirms the current selection. Labels
    /// from a superseded search are not selectable.
    pub async fn select(&self, context_id: &str, label: Option<String>) -> Result<(), BridgeError> {
        let handle = self.session(context_id);
        let mut core = handle.core.lock().await;

        if !core.search_enabled {
            core.clear_to_disabled();
            core.status = StatusRecord::new(Stage::Disabled, "Search toggle is off");
            handle.commit(&core, true);
            return Err(BridgeError::PreconditionFailed {
                reason: "Candidate selection blocked: search toggle is off".to_string(),
            });
        }

        let chosen_label = label.unwrap_or_else(|| core.selected.clone());
        let chosen = core
            .lookup
            .values()
            .find(|c| c.label == chosen_label)
            .cloned();

        let Some(chosen) = chosen else {
            core.status = StatusRecord::new(
                Stage::Error { selected: None },
                format!("Candidate '{}' not found in last results", chosen_label),
            );
            handle.commit(&core, false);
            return Err(BridgeError::SelectionNotFound {
                label: chosen_label,
            });
        };

        core.selected = chosen.label.clone();
        core.detail = Some(chosen);
        handle.commit(&core, true);

        core.status = StatusRecord::new(
            Stage::Ready {
                candidates: core.lookup.len(),
                selected: core.selected.clone(),
            },
            "Candidate selected",
        );
        handle.commit(&core, false);

        Ok(())
    }

    /// Load the currently selected candidate into the BEQ device.
    ///
    /// Writes the candidate's TMDB id, year, and audio type (and optionally
    /// edition/title) into the named state-store destinations, then invokes
    /// the external profile-load operation.
    pub async fn load(&self, context_id: &str, params: LoadParams) -> Result<(), BridgeError> {
        let handle = self.session(context_id);
        let mut core = handle.core.lock().await;

        if !core.search_enabled {
            core.clear_to_disabled();
            core.status = StatusRecord::new(Stage::Disabled, "Search toggle is off");
            handle.commit(&core, true);
            return Err(BridgeError::PreconditionFailed {
                reason: "Manual load blocked: search toggle is off".to_string(),
            });
        }

        let selected = core.selected.clone();
        let detail = match core.detail.clone() {
            Some(detail) if selected != SENTINEL_NONE && selected != SENTINEL_DISABLED => detail,
            _ => {
                core.status = StatusRecord::new(
                    Stage::Error {
                        selected: Some(selected.clone()),
                    },
                    "No candidate selected to load",
                );
                handle.commit(&core, false);
                return Err(BridgeError::PreconditionFailed {
                    reason: "No candidate selected to load".to_string(),
                });
            }
        };

        if detail.tmdb_id.trim().is_empty() {
            core.status = StatusRecord::new(
                Stage::Error {
                    selected: Some(selected.clone()),
                },
                "Candidate details missing a TMDB id",
            );
            handle.commit(&core, false);
            return Err(BridgeError::PreconditionFailed {
                reason: "Candidate details missing a TMDB id".to_string(),
            });
        }

        let (tmdb_sensor, year_sensor, codec_sensor) = match (
            params.tmdb_sensor,
            params.year_sensor,
            params.codec_sensor,
        ) {
            (Some(tmdb), Some(year), Some(codec)) => (tmdb, year, codec),
            (tmdb, year, codec) => {
                let mut missing = Vec::new();
                if tmdb.is_none() {
                    missing.push("tmdb_sensor");
                }
                if year.is_none() {
                    missing.push("year_sensor");
                }
                if codec.is_none() {
                    missing.push("codec_sensor");
                }
                let reason = format!("Missing required load parameters: {}", missing.join(", "));
                core.status = StatusRecord::new(
                    Stage::Error {
                        selected: Some(selected.clone()),
                    },
                    reason.clone(),
                );
                handle.commit(&core, false);
                return Err(BridgeError::PreconditionFailed { reason });
            }
        };

        self.store.set(&tmdb_sensor, detail.tmdb_id.clone());
        self.store
            .set(&year_sensor, detail.year.unwrap_or(0).to_string());
        self.store.set(&codec_sensor, detail.audio_type.clone());
        if let Some(key) = &params.edition_sensor {
            self.store.set(key, detail.edition.clone());
        }
        if let Some(key) = &params.title_sensor {
            self.store.set(key, detail.title.clone());
        }

        let request = LoadRequest {
            tmdb_sensor,
            year_sensor,
            codec_sensor,
            edition_sensor: params.edition_sensor,
            title_sensor: params.title_sensor,
            preferred_author: detail.author.clone(),
            slots: params.slots.unwrap_or_else(default_slots),
            enable_audio_codec_substitutions: params.enable_audio_codec_substitutions,
            manual_load: true,
        };

        if let Err(e) = self.loader.load_profile(&request).await {
            error!("Failed to load BEQ profile: {:#}", e);
            core.status = StatusRecord::new(
                Stage::Error {
                    selected: Some(selected.clone()),
                },
                format!("Failed to load BEQ profile: {:#}", e),
            );
            handle.commit(&core, false);
            return Err(BridgeError::Downstream {
                operation: "load",
                source: e,
            });
        }

        core.status = StatusRecord::new(
            Stage::Loaded {
                selected: selected.clone(),
            },
            format!("Candidate '{}' loaded into BEQ profile", selected),
        );
        handle.commit(&core, false);
        info!(
            "Loaded candidate '{}' in context '{}'",
            selected, context_id
        );

        Ok(())
    }

    /// Unload the profile from the given slots via an empty request.
    pub async fn unload(&self, context_id: &str, params: UnloadParams) -> Result<(), BridgeError> {
        let handle = self.session(context_id);
        let request = LoadRequest::unload_for_slots(params.slots.unwrap_or_else(default_slots));

        if let Err(e) = self.loader.unload_profile(&request).await {
            error!("Failed to unload BEQ profile: {:#}", e);
            let mut core = handle.core.lock().await;
            core.status = StatusRecord::new(
                Stage::Error { selected: None },
                format!("Failed to unload BEQ profile: {:#}", e),
            );
            handle.commit(&core, false);
            return Err(BridgeError::Downstream {
                operation: "unload",
                source: e,
            });
        }

        Ok(())
    }
}
