use crate::domain::entities::post_record::PostRecord;
use crate::domain::error::DomainError;
use crate::domain::values::day_sentiment::DaySentiment;
use crate::domain::values::source_key::SourceKey;

/// Per-day sentiment cache.
///
/// Slots are keyed by bucket length as well as start, so an hourly slot is
/// never read back as a whole day.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Cached score of the `day_length`-second bucket starting at `day`, or
    /// `None` when it has never been computed (or was computed without any data).
    async fn get(&self, key: &SourceKey, day_length: i64, day: i64) -> Result<Option<f64>, DomainError>;

    /// Write the value of a bucket; last write wins.
    async fn put(&self, key: &SourceKey, day_length: i64, day: i64, value: DaySentiment) -> Result<(), DomainError>;
}

/// Per-item score records.
#[async_trait::async_trait]
pub trait PostStore: Send + Sync {
    async fn put(&self, key: &SourceKey, record: &PostRecord) -> Result<(), DomainError>;

    /// Most recent records for `key`, newest item first.
    async fn list(&self, key: &SourceKey, limit: usize) -> Result<Vec<PostRecord>, DomainError>;
}
