//! Stock media search client.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use lectura_models::{MediaItem, MediaKind};

pub type VisualsResult<T> = Result<T, VisualsError>;

#[derive(Debug, Error)]
pub enum VisualsError {
    #[error("Visuals configuration error: {0}")]
    Config(String),

    #[error("Media search failed: {0}")]
    SearchFailed(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A media search backend queried by scene keywords.
#[async_trait]
pub trait VisualSearch: Send + Sync {
    /// Search for one media item matching the keywords.
    ///
    /// `None` means no match, which is a normal outcome.
    async fn search(&self, keywords: &[String]) -> VisualsResult<Option<MediaItem>>;
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    url: String,
}

/// HTTP client for the stock media provider.
#[derive(Clone)]
pub struct StockMediaClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl StockMediaClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Create from `MEDIA_SEARCH_BASE_URL` / `MEDIA_SEARCH_API_KEY`.
    ///
    /// Returns a config error when the key is absent; callers treat that as
    /// "visuals disabled" rather than a failure.
    pub fn from_env() -> VisualsResult<Self> {
        let base_url = std::env::var("MEDIA_SEARCH_BASE_URL")
            .map_err(|_| VisualsError::Config("MEDIA_SEARCH_BASE_URL not set".to_string()))?;
        let api_key = std::env::var("MEDIA_SEARCH_API_KEY")
            .map_err(|_| VisualsError::Config("MEDIA_SEARCH_API_KEY not set".to_string()))?;
        Ok(Self::new(base_url, api_key))
    }

    /// Fetch at most one media item per keyword set, dropping scenes whose
    /// search failed. Never returns an error: visuals degrade, they do not
    /// fail jobs.
    pub async fn fetch_for_scenes(&self, scene_keywords: &[Vec<String>]) -> Vec<MediaItem> {
        let mut items = Vec::new();

        for keywords in scene_keywords {
            match self.search(keywords).await {
                Ok(Some(item)) => items.push(item),
                Ok(None) => {
                    debug!(?keywords, "No media found for scene");
                }
                Err(e) => {
                    warn!(?keywords, error = %e, "Media search failed; continuing without media");
                }
            }
        }

        items
    }
}

#[async_trait]
impl VisualSearch for StockMediaClient {
    async fn search(&self, keywords: &[String]) -> VisualsResult<Option<MediaItem>> {
        if keywords.is_empty() {
            return Ok(None);
        }

        let url = format!("{}/v1/search", self.base_url);
        let query = keywords.join(" ");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(&[("query", query.as_str()), ("per_page", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VisualsError::SearchFailed(format!(
                "search returned {}",
                response.status()
            )));
        }

        let body: SearchResponse = response.json().await?;
        let item = body.items.into_iter().next().map(|item| MediaItem {
            kind: match item.kind.as_deref() {
                Some("video") => MediaKind::Video,
                _ => MediaKind::Image,
            },
            url: item.url,
            keywords: keywords.to_vec(),
        });

        Ok(item)
    }
}
