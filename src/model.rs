use serde::{Deserialize, Serialize};

/// Placeholder used when a catalog has no title for a record.
pub const UNKNOWN_TITLE: &str = "Título não disponível";

/// Placeholder used when no author name could be resolved.
pub const UNKNOWN_AUTHOR: &str = "Autor não disponível";

/// Which catalog answered the lookup. Wire values match the original API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookSource {
    #[serde(rename = "google-books")]
    Primary,
    #[serde(rename = "open-library")]
    Fallback,
}

/// The canonical book-metadata record, built fresh per request and returned
/// regardless of which upstream catalog answered.
///
/// Invariants: `image_url`, when present, is always HTTPS; `authors` is never
/// empty (a single [`UNKNOWN_AUTHOR`] entry stands in when nothing resolved).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookInfo {
    pub title: String,
    pub authors: Vec<String>,
    pub description: String,
    pub image_url: Option<String>,
    pub publisher: String,
    pub published_date: String,
    pub average_rating: Option<f64>,
    pub ratings_count: Option<u64>,
    pub page_count: Option<u64>,
    pub categories: Vec<String>,
    pub source: BookSource,
}
