//! Resolves the markdown body of a blog post.
//!
//! Inline `content` is used as-is. Posts with a `markdown_url` are fetched
//! with a single GET; any failure becomes [`FETCH_ERROR_DOCUMENT`] for the
//! reader rather than an error page. Nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::resume::BlogPost;

/// Shown in place of a post whose remote body could not be fetched.
pub const FETCH_ERROR_DOCUMENT: &str = "# Error\n\nCould not load the blog post content. \
    Please check your internet connection or the file URL.";

#[derive(Debug, Error)]
pub enum ContentFetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote markdown returned status {0}")]
    Status(u16),
}

#[async_trait]
pub trait MarkdownFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, ContentFetchError>;
}

/// Plain GET; 2xx bodies are returned verbatim as UTF-8 text.
pub struct HttpMarkdownFetcher {
    client: Client,
}

impl HttpMarkdownFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait]
impl MarkdownFetcher for HttpMarkdownFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ContentFetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContentFetchError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

/// The remote locator of a post, ignoring blank values.
pub fn remote_url(post: &BlogPost) -> Option<&str> {
    post.markdown_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
}

/// Body of a post that needs no network call, `None` when it must be fetched.
pub fn inline_content(post: &BlogPost) -> Option<String> {
    match remote_url(post) {
        Some(_) => None,
        None => Some(post.content.clone().unwrap_or_default()),
    }
}

#[derive(Clone)]
pub struct PostContentLoader {
    fetcher: Arc<dyn MarkdownFetcher>,
}

impl PostContentLoader {
    pub fn new(fetcher: Arc<dyn MarkdownFetcher>) -> Self {
        Self { fetcher }
    }

    /// Resolves the body, surfacing fetch failures to the caller.
    pub async fn fetch_content(&self, post: &BlogPost) -> Result<String, ContentFetchError> {
        let Some(url) = remote_url(post) else {
            return Ok(post.content.clone().unwrap_or_default());
        };

        debug!("Fetching markdown for post {} from {}", post.id, url);
        self.fetcher.fetch(url).await.map_err(|e| {
            warn!("Failed to load post {} from {}: {}", post.id, url, e);
            e
        })
    }

    /// Resolves the body; failures become [`FETCH_ERROR_DOCUMENT`].
    pub async fn load_content(&self, post: &BlogPost) -> String {
        self.fetch_content(post)
            .await
            .unwrap_or_else(|_| FETCH_ERROR_DOCUMENT.to_string())
    }
}
