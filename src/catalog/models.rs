//! Catalogue record model.
//!
//! The upstream catalogue is hand-maintained and its field types drift:
//! `theMovieDB` may be a string or a number, `audioTypes` a list or a single
//! comma-separated string, `author` a string or a list. Deserialization
//! accepts all observed shapes rather than rejecting records.

use anyhow::{bail, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::inputs::parse_values;

/// One catalogue entry describing a release and its calibration audio tracks.
///
/// The same logical release may appear with several audio-track types; those
/// expand into separate candidates downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogItem {
    #[serde(rename = "theMovieDB", deserialize_with = "de_flexible_string")]
    pub tmdb_id: String,
    pub title: String,
    #[serde(rename = "altTitle")]
    pub alt_title: String,
    #[serde(deserialize_with = "de_flexible_year")]
    pub year: Option<i32>,
    pub edition: String,
    #[serde(rename = "audioTypes", deserialize_with = "de_strict_list")]
    pub audio_types: Vec<String>,
    #[serde(deserialize_with = "de_strict_list")]
    pub genres: Vec<String>,
    #[serde(deserialize_with = "de_strict_list")]
    pub genre: Vec<String>,
    #[serde(deserialize_with = "de_strict_list")]
    pub author: Vec<String>,
    #[serde(deserialize_with = "de_strict_list")]
    pub authors: Vec<String>,
    #[serde(deserialize_with = "de_lenient_list")]
    pub images: Vec<String>,
    #[serde(deserialize_with = "de_flexible_number")]
    pub mv: Option<f64>,
    pub warning: String,
    pub note: String,
    pub source: String,
    pub content_type: String,
    pub language: String,
}

impl CatalogItem {
    /// Genre labels, whichever of the two catalogue spellings is populated.
    pub fn genre_labels(&self) -> &[String] {
        if !self.genres.is_empty() {
            &self.genres
        } else {
            &self.genre
        }
    }

    /// Author labels, falling back from `author` to `authors`.
    pub fn author_labels(&self) -> &[String] {
        if !self.author.is_empty() {
            &self.author
        } else {
            &self.authors
        }
    }
}

/// Extract the item list from a catalogue document.
///
/// Accepted shapes: a bare list of records, an object with the list under
/// `"titles"`, or any other object whose values collectively are the items.
/// Records that fail to parse are skipped with a log line; only a document
/// of the wrong overall shape is an error.
pub fn parse_catalog_document(document: Value) -> Result<Vec<CatalogItem>> {
    let records: Vec<Value> = match document {
        Value::Array(list) => list,
        Value::Object(mut map) => match map.remove("titles") {
            Some(Value::Array(list)) => list,
            _ => map.into_iter().map(|(_, v)| v).collect(),
        },
        other => bail!(
            "catalogue document is neither a list nor an object (got {})",
            json_type_name(&other)
        ),
    };

    let total = records.len();
    let mut items = Vec::with_capacity(total);
    let mut skipped = 0usize;
    for record in records {
        match serde_json::from_value::<CatalogItem>(record) {
            Ok(item) => items.push(item),
            Err(e) => {
                skipped += 1;
                debug!("Skipping unparseable catalogue record: {}", e);
            }
        }
    }
    if skipped > 0 {
        warn!("Skipped {}/{} unparseable catalogue records", skipped, total);
    }

    Ok(items)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// String or number → `String`; null → empty.
fn de_flexible_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Number or numeric string → `Some(year)`; anything else → `None`.
fn de_flexible_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_i64().map(|y| y as i32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Number or numeric string → `Some(f64)`; anything else → `None`.
fn de_flexible_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// List of strings with trimming; a bare string is split like an input value
/// (so `"Atmos, 5.1"` becomes two entries), never exploded into characters.
fn de_strict_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(strict_list(value))
}

fn strict_list(value: Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(list) => list
            .into_iter()
            .filter(|v| !v.is_null())
            .map(scalar_to_string)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => {
            let parsed = parse_values(Some(&s));
            if !parsed.is_empty() {
                parsed
            } else if !s.trim().is_empty() {
                vec![s.trim().to_string()]
            } else {
                Vec::new()
            }
        }
        other => {
            let s = scalar_to_string(other);
            let s = s.trim().to_string();
            if s.is_empty() {
                Vec::new()
            } else {
                vec![s]
            }
        }
    }
}

/// List of strings without trimming or splitting; a scalar becomes a
/// one-element list. Used for image references.
fn de_lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => Vec::new(),
        Value::Array(list) => list
            .into_iter()
            .filter(|v| !v.is_null())
            .map(scalar_to_string)
            .collect(),
        other => vec![scalar_to_string(other)],
    })
}

fn scalar_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
