//! Feed adapter ports: the only platform-specific pieces of the collection pipeline.
//!
//! A platform supplies a [`FeedAdapter`] that pages through top-level content newest
//! first, and a [`ReplyFetcher`] that expands one item into its replies. Everything
//! else (windowing, bucketing, threading, caching) is shared.

use crate::domain::entities::item::Item;
use async_trait::async_trait;
use thiserror::Error;

/// Opaque continuation token handed back by a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(pub String);

impl Cursor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Cursor {
    fn from(s: String) -> Self {
        Cursor(s)
    }
}

impl From<&str> for Cursor {
    fn from(s: &str) -> Self {
        Cursor(s.to_string())
    }
}

/// One page of a reverse-chronological feed.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Items ordered newest to oldest by `created_at`.
    pub items: Vec<Item>,
    /// Cursor for the page after this one; `None` when the feed has no more pages.
    pub next_cursor: Option<Cursor>,
}

impl Page {
    pub fn new(items: Vec<Item>, next_cursor: Option<Cursor>) -> Self {
        Self { items, next_cursor }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Error)]
pub enum FeedError {
    /// Connection, timeout or other transport failure
    #[error("Network error: {0}")]
    Network(String),
    /// Non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    /// Response body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
    /// Credentials rejected or token exchange failed
    #[error("Auth error: {0}")]
    Auth(String),
}

impl FeedError {
    /// Transport failures, rate limits and server errors are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            FeedError::Network(_) => true,
            FeedError::Http { status, .. } => *status == 429 || *status >= 500,
            FeedError::Parse(_) | FeedError::Auth(_) => false,
        }
    }
}

/// A paginated, reverse-chronological source of top-level items.
#[async_trait]
pub trait FeedAdapter: Send + Sync {
    /// Adapter name for logging.
    fn name(&self) -> &str;

    /// Fetch the page after `cursor` (the first page when `None`).
    /// An empty page means the feed is exhausted.
    async fn next_page(&self, cursor: Option<&Cursor>) -> Result<Page, FeedError>;
}

/// Expands an item into the replies the platform knows about.
///
/// Must be idempotent: the pipeline retries it on transient errors.
#[async_trait]
pub trait ReplyFetcher: Send + Sync {
    async fn fetch_replies(&self, item: &Item) -> Result<Vec<Item>, FeedError>;
}
