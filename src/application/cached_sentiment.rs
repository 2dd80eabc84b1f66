use crate::domain::entities::post_record::PostRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::sentiment_store::{CacheStore, PostStore};
use crate::domain::values::source_key::SourceKey;
use crate::domain::values::time_window::TimeWindow;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Read-only view of what earlier runs stored. Never touches a platform API.
pub struct CachedSentimentUseCase {
    cache_store: Arc<dyn CacheStore>,
    post_store: Arc<dyn PostStore>,
}

impl CachedSentimentUseCase {
    pub fn new(cache_store: Arc<dyn CacheStore>, post_store: Arc<dyn PostStore>) -> Self {
        Self {
            cache_store,
            post_store,
        }
    }

    /// One entry per window day; `None` where nothing usable is cached.
    pub async fn days(&self, key: &SourceKey, window: &TimeWindow) -> Result<BTreeMap<i64, Option<f64>>, DomainError> {
        let mut days = BTreeMap::new();
        for day in window.days() {
            days.insert(day, self.cache_store.get(key, window.day_length(), day).await?);
        }
        Ok(days)
    }

    pub async fn posts(&self, key: &SourceKey, limit: usize) -> Result<Vec<PostRecord>, DomainError> {
        if limit == 0 {
            return Err(DomainError::InvalidInput("limit must be positive".into()));
        }
        self.post_store.list(key, limit).await
    }
}
