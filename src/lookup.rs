use std::sync::Arc;

use async_trait::async_trait;

use crate::google_books::{self, GoogleBooksSource};
use crate::isbn;
use crate::model::BookInfo;
use crate::open_library::{self, OpenLibrarySource};

/// Keyed catalog consulted first. A miss is `Ok(None)`; transport errors and
/// non-success statuses are `Err` (the orchestrator decides fall-through).
#[async_trait]
pub trait PrimarySource: Send + Sync {
    async fn search(&self, query: &str) -> anyhow::Result<Option<BookInfo>>;
}

/// Open catalog consulted for ISBN-shaped queries when the primary source is
/// unavailable, empty, or failing. A non-success status is the normal
/// not-found outcome (`Ok(None)`); only transport failures are `Err`.
#[async_trait]
pub trait FallbackSource: Send + Sync {
    async fn by_isbn(&self, query: &str) -> anyhow::Result<Option<BookInfo>>;
}

#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub google_books_api_key: Option<String>,
    pub google_books_base_url: String,
    pub open_library_base_url: String,
    pub covers_base_url: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            google_books_api_key: None,
            google_books_base_url: google_books::DEFAULT_BASE_URL.to_string(),
            open_library_base_url: open_library::DEFAULT_BASE_URL.to_string(),
            covers_base_url: open_library::DEFAULT_COVERS_BASE_URL.to_string(),
        }
    }
}

impl LookupConfig {
    /// Reads the credential from the environment; a missing or blank value
    /// means the primary catalog is not attempted at all. Base URLs keep
    /// their defaults; tests override them on the struct directly.
    pub fn from_env() -> Self {
        Self {
            google_books_api_key: env_nonempty("LEITURES_GOOGLE_BOOKS_API_KEY"),
            ..Self::default()
        }
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Orchestrates the normalizer and the two catalog sources.
///
/// `Ok(Some(_))` is a hit, `Ok(None)` is the normal not-found outcome, and
/// `Err(_)` is an upstream failure worth surfacing as a server error.
#[derive(Clone)]
pub struct BookLookup {
    primary: Option<Arc<dyn PrimarySource>>,
    fallback: Arc<dyn FallbackSource>,
}

impl BookLookup {
    pub fn new(client: reqwest::Client, config: LookupConfig) -> Self {
        let primary = config.google_books_api_key.as_deref().map(|key| {
            Arc::new(GoogleBooksSource::new(
                client.clone(),
                config.google_books_base_url.clone(),
                key,
            )) as Arc<dyn PrimarySource>
        });
        tracing::info!(
            has_api_key = primary.is_some(),
            "book lookup configured"
        );

        let fallback = Arc::new(OpenLibrarySource::new(
            client,
            config.open_library_base_url,
            config.covers_base_url,
        )) as Arc<dyn FallbackSource>;

        Self { primary, fallback }
    }

    pub fn with_sources(
        primary: Option<Arc<dyn PrimarySource>>,
        fallback: Arc<dyn FallbackSource>,
    ) -> Self {
        Self { primary, fallback }
    }

    pub async fn resolve(&self, raw_query: &str) -> anyhow::Result<Option<BookInfo>> {
        let query = isbn::normalize_query(raw_query);
        let isbn_shaped = isbn::is_isbn_shaped(&query);
        tracing::debug!(query = %query, isbn_shaped, "resolving book query");

        if let Some(primary) = &self.primary {
            match primary.search(&query).await {
                Ok(Some(info)) => {
                    tracing::info!(source = "google-books", "primary catalog answered");
                    return Ok(Some(info));
                }
                Ok(None) => {
                    tracing::info!("primary catalog returned no results");
                }
                // Primary failures never surface; they only gate whether the
                // fallback is worth trying.
                Err(err) => {
                    tracing::warn!(error = format!("{err:#}"), "primary catalog failed");
                }
            }
        } else {
            tracing::info!("no primary credential configured; skipping primary catalog");
        }

        // The open catalog is addressed by ISBN only; free-text queries that
        // the primary could not answer are a final not-found.
        if !isbn_shaped {
            return Ok(None);
        }

        let result = self.fallback.by_isbn(&query).await?;
        if result.is_some() {
            tracing::info!(source = "open-library", "fallback catalog answered");
        }
        Ok(result)
    }
}
