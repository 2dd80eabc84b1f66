use super::SharedConnection;
use crate::domain::error::DomainError;
use crate::domain::ports::sentiment_store::CacheStore;
use crate::domain::values::day_sentiment::DaySentiment;
use crate::domain::values::source_key::SourceKey;
use rusqlite::{params, OptionalExtension};

/// Day slots in `day_sentiments`. `NoData` is stored as NULL and reads back
/// as a miss, so such days are recomputed on the next run.
pub struct SqliteCacheRepo {
    conn: SharedConnection,
}

impl SqliteCacheRepo {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl CacheStore for SqliteCacheRepo {
    async fn get(&self, key: &SourceKey, day_length: i64, day: i64) -> Result<Option<f64>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Persistence(e.to_string()))?;
        let score: Option<Option<f64>> = conn
            .query_row(
                "SELECT score FROM day_sentiments
                 WHERE platform = ?1 AND source = ?2 AND day_length = ?3 AND day_ts = ?4",
                params![key.platform.to_string(), key.source, day_length, day],
                |row| row.get(0),
            )
            .optional()?;
        Ok(score.flatten().filter(|v| v.is_finite()))
    }

    async fn put(&self, key: &SourceKey, day_length: i64, day: i64, value: DaySentiment) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Persistence(e.to_string()))?;
        conn.execute(
            "INSERT INTO day_sentiments (platform, source, day_length, day_ts, score, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(platform, source, day_length, day_ts) DO UPDATE SET
                score = excluded.score,
                updated_at = excluded.updated_at",
            params![
                key.platform.to_string(),
                key.source,
                day_length,
                day,
                value.score(),
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}
