//! The candidate record and its derived key and label.

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogItem;

/// One selectable candidate, immutable once built.
///
/// `key` is the deduplication identity; `label` is the only handle a caller
/// has for selection. Label uniqueness is not enforced, so two distinct
/// candidates can render identically and make selection-by-label ambiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub key: String,
    pub label: String,
    pub tmdb_id: String,
    pub title: String,
    pub alt_title: String,
    pub year: Option<i32>,
    pub edition: String,
    pub edition_display: String,
    pub audio_type: String,
    pub audio_types: Vec<String>,
    pub audio_types_text: String,
    pub author: String,
    pub mv: Option<f64>,
    pub warning: String,
    pub note: String,
    pub image1: Option<String>,
    pub image2: Option<String>,
    pub source: String,
    pub content_type: String,
    pub language: String,
    pub genres: Vec<String>,
    pub genres_text: String,
}

impl Candidate {
    /// Build the candidate for one audio-track type of a catalogue item.
    ///
    /// An item without audio types is passed an empty `audio_type`, rendered
    /// as "Unknown" in the label.
    pub fn from_item(item: &CatalogItem, audio_type: &str) -> Self {
        let edition_display = if item.edition.is_empty() {
            "—".to_string()
        } else {
            item.edition.clone()
        };

        let author = display_join(item.author_labels());
        let genres: Vec<String> = item.genre_labels().to_vec();

        let (image1, image2) = first_two_images(&item.images);

        Self {
            key: candidate_key(item, audio_type),
            label: render_label(item, &edition_display, audio_type, &author),
            tmdb_id: item.tmdb_id.clone(),
            title: item.title.clone(),
            alt_title: item.alt_title.clone(),
            year: item.year,
            edition: item.edition.clone(),
            edition_display,
            audio_type: audio_type.to_string(),
            audio_types: item.audio_types.clone(),
            audio_types_text: item.audio_types.join(", "),
            author,
            mv: item.mv,
            warning: item.warning.clone(),
            note: item.note.clone(),
            image1,
            image2,
            source: item.source.clone(),
            content_type: item.content_type.clone(),
            language: item.language.clone(),
            genres_text: genres.join(", "),
            genres,
        }
    }
}

/// Deduplication key: TMDB id, title, edition, single audio type, and the
/// raw `author` field, pipe-joined. Note the fallback to `authors` applies
/// only to the display string, not the key.
pub(crate) fn candidate_key(item: &CatalogItem, audio_type: &str) -> String {
    [
        item.tmdb_id.trim(),
        item.title.trim(),
        item.edition.trim(),
        audio_type.trim(),
        &item.author.join(","),
    ]
    .join("|")
}

fn render_label(
    item: &CatalogItem,
    edition_display: &str,
    audio_type: &str,
    author: &str,
) -> String {
    let title = if item.title.is_empty() {
        "?"
    } else {
        item.title.as_str()
    };
    let year = item
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "?".to_string());
    let audio = if audio_type.is_empty() {
        "Unknown"
    } else {
        audio_type
    };
    let author = if author.is_empty() { "n/a" } else { author };

    format!(
        "{} ({}) • {} • {} • {}",
        title, year, edition_display, audio, author
    )
}

fn display_join(labels: &[String]) -> String {
    labels
        .iter()
        .filter(|a| !a.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

fn first_two_images(images: &[String]) -> (Option<String>, Option<String>) {
    (images.first().cloned(), images.get(1).cloned())
}
