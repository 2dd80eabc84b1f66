pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::cached_sentiment::CachedSentimentUseCase;
use crate::application::collect_sentiment::{CollectSentimentUseCase, SentimentReport};
use crate::cli::commands::{Commands, Request};
use crate::config::JesterConfig;
use crate::domain::entities::post_record::PostRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::feed_adapter::{FeedAdapter, ReplyFetcher};
use crate::domain::ports::scorer::Scorer;
use crate::domain::ports::sentiment_store::{CacheStore, PostStore};
use crate::domain::values::platform::Platform;
use crate::domain::values::source_key::SourceKey;
use crate::domain::values::time_window::TimeWindow;
use crate::infrastructure::feeds::build_source;
use crate::infrastructure::scoring::build_scorer;
use crate::infrastructure::sqlite::cache_repo::SqliteCacheRepo;
use crate::infrastructure::sqlite::post_repo::SqlitePostRepo;
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct Jester {
    config: JesterConfig,
    collect_uc: CollectSentimentUseCase,
    cached_uc: CachedSentimentUseCase,
}

impl Jester {
    /// Validates `command`, then opens the store. A rejected command leaves
    /// nothing on disk.
    pub fn prepare(config: JesterConfig, command: Commands) -> Result<(Self, Request), DomainError> {
        let request = command.validate(config.day_length)?;
        let jester = Self::new(config)?;
        Ok((jester, request))
    }

    pub fn new(config: JesterConfig) -> Result<Self, DomainError> {
        let scorer = build_scorer(&config);
        Self::with_providers(config, scorer)
    }

    /// SQLite stores at `config.db_path` with a caller-supplied scorer.
    pub fn with_providers(config: JesterConfig, scorer: Arc<dyn Scorer>) -> Result<Self, DomainError> {
        let conn = infrastructure::sqlite::open(&config.db_path)?;
        let cache_store: Arc<dyn CacheStore> = Arc::new(SqliteCacheRepo::new(conn.clone()));
        let post_store: Arc<dyn PostStore> = Arc::new(SqlitePostRepo::new(conn));
        Ok(Self::with_stores(config, cache_store, post_store, scorer))
    }

    pub fn with_stores(
        config: JesterConfig,
        cache_store: Arc<dyn CacheStore>,
        post_store: Arc<dyn PostStore>,
        scorer: Arc<dyn Scorer>,
    ) -> Self {
        Self {
            collect_uc: CollectSentimentUseCase::new(
                cache_store.clone(),
                post_store.clone(),
                scorer,
                config.collect_settings(),
            ),
            cached_uc: CachedSentimentUseCase::new(cache_store, post_store),
            config,
        }
    }

    pub fn config(&self) -> &JesterConfig {
        &self.config
    }

    /// Validates the query, then runs it against the platform adapters built
    /// from the config.
    pub async fn collect(
        &self,
        platform: Platform,
        source: &str,
        start: i64,
        end: i64,
    ) -> Result<SentimentReport, DomainError> {
        let (key, window) = self.resolve(platform, source, start, end)?;
        Ok(self.collect_window(&key, &window).await)
    }

    /// Runs an already validated query against the configured platform.
    pub async fn collect_window(&self, key: &SourceKey, window: &TimeWindow) -> SentimentReport {
        let adapters = build_source(key, &self.config);
        self.collect_uc
            .execute(key, window, adapters.feed.as_ref(), adapters.replies.as_ref())
            .await
    }

    /// Same as [`Jester::collect`] with explicit adapters.
    pub async fn collect_with(
        &self,
        key: &SourceKey,
        window: &TimeWindow,
        feed: &dyn FeedAdapter,
        replies: &dyn ReplyFetcher,
    ) -> SentimentReport {
        self.collect_uc.execute(key, window, feed, replies).await
    }

    pub async fn cached(
        &self,
        platform: Platform,
        source: &str,
        start: i64,
        end: i64,
    ) -> Result<BTreeMap<i64, Option<f64>>, DomainError> {
        let (key, window) = self.resolve(platform, source, start, end)?;
        self.cached_window(&key, &window).await
    }

    pub async fn cached_window(&self, key: &SourceKey, window: &TimeWindow) -> Result<BTreeMap<i64, Option<f64>>, DomainError> {
        self.cached_uc.days(key, window).await
    }

    pub async fn posts(&self, platform: Platform, source: &str, limit: usize) -> Result<Vec<PostRecord>, DomainError> {
        let key = SourceKey::new(platform, source).map_err(DomainError::InvalidInput)?;
        self.posts_of(&key, limit).await
    }

    pub async fn posts_of(&self, key: &SourceKey, limit: usize) -> Result<Vec<PostRecord>, DomainError> {
        self.cached_uc.posts(key, limit).await
    }

    fn resolve(&self, platform: Platform, source: &str, start: i64, end: i64) -> Result<(SourceKey, TimeWindow), DomainError> {
        let window = TimeWindow::with_day_length(start, end, self.config.day_length)?;
        let key = SourceKey::new(platform, source).map_err(DomainError::InvalidInput)?;
        Ok((key, window))
    }
}
