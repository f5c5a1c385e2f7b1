use anyhow::Context as _;
use async_trait::async_trait;
use url::Url;

use crate::isbn;
use crate::lookup::PrimarySource;
use crate::model::{BookInfo, BookSource, UNKNOWN_AUTHOR, UNKNOWN_TITLE};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/books/v1/volumes";

/// Keyed primary catalog: Google Books volume search.
#[derive(Clone)]
pub struct GoogleBooksSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GoogleBooksSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl PrimarySource for GoogleBooksSource {
    async fn search(&self, query: &str) -> anyhow::Result<Option<BookInfo>> {
        let expr = if isbn::is_isbn_shaped(query) {
            format!("isbn:{query}")
        } else {
            query.to_string()
        };

        let url = Url::parse_with_params(
            &self.base_url,
            &[("q", expr.as_str()), ("key", self.api_key.as_str())],
        )
        .with_context(|| format!("build Google Books search url from {}", self.base_url))?;
        tracing::debug!(q = %expr, "Google Books search");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("GET Google Books volumes")?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Google Books status {status}");
        }

        let body: serde_json::Value = response
            .json()
            .await
            .context("parse Google Books response")?;
        let Some(volume) = body
            .get("items")
            .and_then(|v| v.as_array())
            .and_then(|items| items.first())
            .and_then(|item| item.get("volumeInfo"))
        else {
            return Ok(None);
        };

        Ok(Some(map_volume_info(volume)))
    }
}

fn map_volume_info(volume: &serde_json::Value) -> BookInfo {
    let image_url = volume
        .get("imageLinks")
        .and_then(|links| {
            links
                .get("thumbnail")
                .or_else(|| links.get("smallThumbnail"))
        })
        .and_then(|v| v.as_str())
        .map(force_https);

    BookInfo {
        title: str_or(volume, "title", UNKNOWN_TITLE),
        authors: string_list(volume.get("authors"))
            .unwrap_or_else(|| vec![UNKNOWN_AUTHOR.to_string()]),
        description: str_or(volume, "description", ""),
        image_url,
        publisher: str_or(volume, "publisher", ""),
        published_date: str_or(volume, "publishedDate", ""),
        average_rating: volume.get("averageRating").and_then(|v| v.as_f64()),
        ratings_count: volume.get("ratingsCount").and_then(|v| v.as_u64()),
        page_count: volume.get("pageCount").and_then(|v| v.as_u64()),
        categories: string_list(volume.get("categories")).unwrap_or_default(),
        source: BookSource::Primary,
    }
}

fn force_https(url: &str) -> String {
    url.replacen("http:", "https:", 1)
}

fn str_or(value: &serde_json::Value, key: &str, default: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or(default)
        .to_string()
}

fn string_list(value: Option<&serde_json::Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    let list = items
        .iter()
        .filter_map(|v| v.as_str())
        .map(str::to_string)
        .collect::<Vec<_>>();
    if list.is_empty() { None } else { Some(list) }
}
