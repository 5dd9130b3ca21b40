//! Search status taxonomy.
//!
//! Each stage carries only the fields meaningful for that stage, so
//! observers never have to guess which attributes are present.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Where the candidate workflow currently stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    /// The search toggle is off; all session state is cleared.
    Disabled,

    /// No TMDB ids or title prefixes were supplied. Quiescent, not an error.
    WaitingForInput {
        id_source_found: bool,
        title_source_found: bool,
        id_count: usize,
        title_count: usize,
    },

    /// A search is running; written before the catalogue is consulted.
    Searching {
        id_source_found: bool,
        title_source_found: bool,
        id_count: usize,
        title_count: usize,
    },

    /// The catalogue could not be fetched and no cache was usable.
    CatalogUnavailable,

    /// The catalogue was reachable but nothing matched. Not an error.
    NoCandidates {
        candidates: usize,
        id_count: usize,
        title_count: usize,
    },

    /// Candidates are available and one is selected.
    Ready { candidates: usize, selected: String },

    /// The selected candidate was loaded into the device.
    Loaded { selected: String },

    /// A selection or load invocation failed.
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selected: Option<String>,
    },
}

impl Stage {
    /// Stable lowercase name of the stage, matching its serialized tag.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Disabled => "disabled",
            Stage::WaitingForInput { .. } => "waiting_for_input",
            Stage::Searching { .. } => "searching",
            Stage::CatalogUnavailable => "catalog_unavailable",
            Stage::NoCandidates { .. } => "no_candidates",
            Stage::Ready { .. } => "ready",
            Stage::Loaded { .. } => "loaded",
            Stage::Error { .. } => "error",
        }
    }
}

/// The full status record, overwritten wholesale on every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    #[serde(flatten)]
    pub stage: Stage,
    pub reason: String,
    /// Unix timestamp of the transition.
    pub last_updated: i64,
}

impl StatusRecord {
    pub fn new(stage: Stage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
            last_updated: Utc::now().timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // Serialization tests
    // ==========================================================================

    #[test]
    fn test_stage_tag_names() {
        let json = serde_json::to_string(&Stage::Disabled).unwrap();
        assert_eq!(json, r#"{"stage":"disabled"}"#);

        let json = serde_json::to_string(&Stage::Ready {
            candidates: 2,
            selected: "x".to_string(),
        })
        .unwrap();
        assert!(json.contains(r#""stage":"ready""#));
        assert!(json.contains(r#""candidates":2"#));
    }

    #[test]
    fn test_error_stage_omits_absent_selected() {
        let json = serde_json::to_string(&Stage::Error { selected: None }).unwrap();
        assert_eq!(json, r#"{"stage":"error"}"#);

        let json = serde_json::to_string(&Stage::Error {
            selected: Some("x".to_string()),
        })
        .unwrap();
        assert!(json.contains(r#""selected":"x""#));
    }

    #[test]
    fn test_status_record_flattens_stage() {
        let record = StatusRecord::new(
            Stage::NoCandidates {
                candidates: 0,
                id_count: 1,
                title_count: 0,
            },
            "no matches",
        );
        let json = serde_json::to_string(&record).unwrap();

        assert!(json.contains(r#""stage":"no_candidates""#));
        assert!(json.contains(r#""reason":"no matches""#));
        assert!(json.contains(r#""last_updated""#));

        let parsed: StatusRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_stage_names_match_tags() {
        let stage = Stage::WaitingForInput {
            id_source_found: false,
            title_source_found: false,
            id_count: 0,
            title_count: 0,
        };
        let json = serde_json::to_string(&stage).unwrap();
        assert!(json.contains(&format!(r#""stage":"{}""#, stage.name())));
    }
}
