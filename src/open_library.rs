use anyhow::Context as _;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::task::JoinSet;

use crate::isbn;
use crate::lookup::FallbackSource;
use crate::model::{BookInfo, BookSource, UNKNOWN_AUTHOR, UNKNOWN_TITLE};

pub const DEFAULT_BASE_URL: &str = "https://openlibrary.org";
pub const DEFAULT_COVERS_BASE_URL: &str = "https://covers.openlibrary.org";

const MAX_AUTHOR_LOOKUPS: usize = 3;
const MAX_CATEGORIES: usize = 3;

/// Open fallback catalog: Open Library edition records by ISBN.
#[derive(Clone)]
pub struct OpenLibrarySource {
    client: reqwest::Client,
    base_url: String,
    covers_base_url: String,
}

impl OpenLibrarySource {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        covers_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            covers_base_url: covers_base_url.into(),
        }
    }

    /// Resolves up to [`MAX_AUTHOR_LOOKUPS`] author references concurrently.
    /// A lookup that fails or comes back nameless is skipped; the record is
    /// still usable without it.
    async fn resolve_authors(&self, refs: &[AuthorRef]) -> anyhow::Result<Vec<String>> {
        let capped = &refs[..refs.len().min(MAX_AUTHOR_LOOKUPS)];
        let mut join_set = JoinSet::new();
        for (idx, author) in capped.iter().enumerate() {
            let Some(key) = author.key.clone() else {
                continue;
            };
            let client = self.client.clone();
            let url = format!("{}{key}.json", self.base_url);
            join_set.spawn(async move { (idx, fetch_author_name(&client, &url).await) });
        }

        let mut names: Vec<Option<String>> = vec![None; capped.len()];
        while let Some(joined) = join_set.join_next().await {
            let (idx, outcome) = joined.context("join author lookup")?;
            match outcome {
                Ok(Some(name)) if !name.trim().is_empty() => names[idx] = Some(name),
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(error = format!("{err:#}"), "author lookup failed; skipping");
                }
            }
        }

        let resolved = names.into_iter().flatten().collect::<Vec<_>>();
        if resolved.is_empty() {
            Ok(vec![UNKNOWN_AUTHOR.to_string()])
        } else {
            Ok(resolved)
        }
    }
}

#[async_trait]
impl FallbackSource for OpenLibrarySource {
    async fn by_isbn(&self, query: &str) -> anyhow::Result<Option<BookInfo>> {
        let clean = isbn::strip_separators(query);
        let meta_url = format!("{}/isbn/{clean}.json", self.base_url);
        tracing::debug!(url = %meta_url, "Open Library metadata fetch");

        let response = self
            .client
            .get(&meta_url)
            .send()
            .await
            .with_context(|| format!("GET {meta_url}"))?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%status, isbn = %clean, "Open Library has no edition");
            return Ok(None);
        }

        let edition: Edition = response
            .json()
            .await
            .context("parse Open Library edition")?;
        let authors = self.resolve_authors(&edition.authors).await?;

        // The covers endpoint is addressed by ISBN directly; the URL is
        // constructed, never fetched for validation.
        let image_url = format!("{}/b/isbn/{clean}-L.jpg", self.covers_base_url);

        Ok(Some(BookInfo {
            title: edition.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            authors,
            description: edition
                .description
                .map(Description::into_text)
                .unwrap_or_default(),
            image_url: Some(image_url),
            publisher: edition.publishers.into_iter().next().unwrap_or_default(),
            published_date: edition.publish_date.unwrap_or_default(),
            average_rating: None,
            ratings_count: None,
            page_count: edition.number_of_pages,
            categories: edition
                .subjects
                .into_iter()
                .take(MAX_CATEGORIES)
                .collect(),
            source: BookSource::Fallback,
        }))
    }
}

async fn fetch_author_name(
    client: &reqwest::Client,
    url: &str,
) -> anyhow::Result<Option<String>> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;
    if !response.status().is_success() {
        return Ok(None);
    }

    let body: serde_json::Value = response.json().await.context("parse Open Library author")?;
    Ok(body
        .get("name")
        .and_then(|v| v.as_str())
        .map(str::to_string))
}

#[derive(Debug, Deserialize)]
struct Edition {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<AuthorRef>,
    description: Option<Description>,
    #[serde(default)]
    publishers: Vec<String>,
    publish_date: Option<String>,
    number_of_pages: Option<u64>,
    #[serde(default)]
    subjects: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AuthorRef {
    key: Option<String>,
}

/// Open Library serves descriptions either as a plain string or as a typed
/// `{ "type": ..., "value": ... }` object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Description {
    Text(String),
    Typed { value: String },
}

impl Description {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Typed { value } => value,
        }
    }
}
