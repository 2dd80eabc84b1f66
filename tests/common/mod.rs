//! Shared test helpers: scripted platform adapters, a predictable scorer and
//! failing stores.
#![allow(dead_code)]

use jester::application::retry::RetryPolicy;
use jester::config::JesterConfig;
use jester::domain::entities::item::Item;
use jester::domain::entities::post_record::PostRecord;
use jester::domain::error::DomainError;
use jester::domain::ports::feed_adapter::{Cursor, FeedAdapter, FeedError, Page, ReplyFetcher};
use jester::domain::ports::scorer::Scorer;
use jester::domain::ports::sentiment_store::{CacheStore, PostStore};
use jester::domain::values::day_sentiment::DaySentiment;
use jester::domain::values::source_key::SourceKey;
use jester::Jester;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 2024-01-01T00:00:00Z
pub const JAN_1: i64 = 1_704_067_200;
pub const DAY: i64 = 86_400;

pub fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
    }
}

pub fn test_config() -> JesterConfig {
    JesterConfig {
        db_path: ":memory:".into(),
        max_retries: 2,
        retry_base_ms: 0,
        concurrency: 4,
        ..JesterConfig::default()
    }
}

pub fn setup(scorer: Arc<dyn Scorer>) -> Jester {
    Jester::with_providers(test_config(), scorer).unwrap()
}

/// A post whose text is its score, for use with [`TextScorer`].
pub fn post(id: &str, created_at: i64, score: f64) -> Item {
    Item::post(id, created_at, score.to_string())
}

pub fn reply(id: &str, created_at: i64, parent: &str, score: f64) -> Item {
    Item::comment(id, created_at, parent, score.to_string())
}

/// Serves pre-built pages. The first page is served for no cursor, page `i`
/// for cursor `p{i}`.
pub struct ScriptedFeed {
    pages: Vec<Page>,
    fail_pages: HashSet<usize>,
    requests: Mutex<Vec<Option<String>>>,
}

impl ScriptedFeed {
    /// Chains `pages` with `p1`, `p2`, ... cursors; the last page has none.
    pub fn new(pages: Vec<Vec<Item>>) -> Self {
        let count = pages.len();
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, items)| {
                let next = (i + 1 < count).then(|| Cursor::from(format!("p{}", i + 1)));
                Page::new(items, next)
            })
            .collect();
        Self::with_pages(pages)
    }

    pub fn with_pages(pages: Vec<Page>) -> Self {
        Self {
            pages,
            fail_pages: HashSet::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests for page `index` fail with a retryable 503.
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_pages.insert(index);
        self
    }

    pub fn requests(&self) -> Vec<Option<String>> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of distinct pages that were asked for.
    pub fn pages_requested(&self) -> usize {
        self.requests().into_iter().collect::<HashSet<_>>().len()
    }
}

#[async_trait::async_trait]
impl FeedAdapter for ScriptedFeed {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn next_page(&self, cursor: Option<&Cursor>) -> Result<Page, FeedError> {
        self.requests
            .lock()
            .unwrap()
            .push(cursor.map(|c| c.as_str().to_string()));
        let index = match cursor {
            None => 0,
            Some(c) => c
                .as_str()
                .trim_start_matches('p')
                .parse::<usize>()
                .map_err(|e| FeedError::Parse(e.to_string()))?,
        };
        if self.fail_pages.contains(&index) {
            return Err(FeedError::Http {
                status: 503,
                message: "unavailable".into(),
            });
        }
        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }
}

/// Replies keyed by parent item id; records every request.
#[derive(Default)]
pub struct RecordingReplies {
    replies: HashMap<String, Vec<Item>>,
    failing: HashSet<String>,
    requested: Mutex<Vec<String>>,
}

impl RecordingReplies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, parent: &str, replies: Vec<Item>) -> Self {
        self.replies.insert(parent.to_string(), replies);
        self
    }

    /// Fetches for `parent` fail with a network error on every attempt.
    pub fn failing_for(mut self, parent: &str) -> Self {
        self.failing.insert(parent.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        let mut ids = self.requested.lock().unwrap().clone();
        ids.sort();
        ids
    }
}

#[async_trait::async_trait]
impl ReplyFetcher for RecordingReplies {
    async fn fetch_replies(&self, item: &Item) -> Result<Vec<Item>, FeedError> {
        self.requested.lock().unwrap().push(item.id.clone());
        if self.failing.contains(&item.id) {
            return Err(FeedError::Network("connection reset".into()));
        }
        Ok(self.replies.get(&item.id).cloned().unwrap_or_default())
    }
}

/// Scores an item as the number in its text; other text is a scoring error.
/// Remembers the context ids each item was scored with.
#[derive(Default)]
pub struct TextScorer {
    contexts: Mutex<HashMap<String, Vec<String>>>,
}

impl TextScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context_of(&self, id: &str) -> Option<Vec<String>> {
        self.contexts.lock().unwrap().get(id).cloned()
    }

    pub fn scored_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.contexts.lock().unwrap().keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait::async_trait]
impl Scorer for TextScorer {
    async fn score(&self, item: &Item, context: &[&Item]) -> Result<f64, DomainError> {
        self.contexts
            .lock()
            .unwrap()
            .insert(item.id.clone(), context.iter().map(|i| i.id.clone()).collect());
        item.text
            .trim()
            .parse::<f64>()
            .map_err(|_| DomainError::Scoring(format!("not a number: {}", item.text)))
    }

    fn name(&self) -> &str {
        "text"
    }
}

/// Store whose every call fails.
pub struct FailingStore;

#[async_trait::async_trait]
impl CacheStore for FailingStore {
    async fn get(&self, _key: &SourceKey, _day_length: i64, _day: i64) -> Result<Option<f64>, DomainError> {
        Err(DomainError::Persistence("disk on fire".into()))
    }

    async fn put(&self, _key: &SourceKey, _day_length: i64, _day: i64, _value: DaySentiment) -> Result<(), DomainError> {
        Err(DomainError::Persistence("disk on fire".into()))
    }
}

#[async_trait::async_trait]
impl PostStore for FailingStore {
    async fn put(&self, _key: &SourceKey, _record: &PostRecord) -> Result<(), DomainError> {
        Err(DomainError::Persistence("disk on fire".into()))
    }

    async fn list(&self, _key: &SourceKey, _limit: usize) -> Result<Vec<PostRecord>, DomainError> {
        Err(DomainError::Persistence("disk on fire".into()))
    }
}
