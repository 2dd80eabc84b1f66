use super::SharedConnection;
use crate::domain::entities::post_record::PostRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::sentiment_store::PostStore;
use crate::domain::values::source_key::SourceKey;
use chrono::DateTime;
use rusqlite::params;

pub struct SqlitePostRepo {
    conn: SharedConnection,
}

impl SqlitePostRepo {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn row_to_record(row: &rusqlite::Row) -> Result<PostRecord, rusqlite::Error> {
        let recorded_str: String = row.get(6)?;
        Ok(PostRecord {
            item_id: row.get(0)?,
            day: row.get(1)?,
            timestamp: row.get(2)?,
            context: row.get(3)?,
            score: row.get(4)?,
            run_id: row.get(5)?,
            recorded_at: DateTime::parse_from_rfc3339(&recorded_str)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
        })
    }
}

#[async_trait::async_trait]
impl PostStore for SqlitePostRepo {
    async fn put(&self, key: &SourceKey, record: &PostRecord) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Persistence(e.to_string()))?;
        conn.execute(
            "INSERT INTO post_scores (platform, source, item_id, day_ts, timestamp, context, score, run_id, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(platform, source, item_id) DO UPDATE SET
                day_ts = excluded.day_ts,
                timestamp = excluded.timestamp,
                context = excluded.context,
                score = excluded.score,
                run_id = excluded.run_id,
                recorded_at = excluded.recorded_at",
            params![
                key.platform.to_string(),
                key.source,
                record.item_id,
                record.day,
                record.timestamp,
                record.context,
                record.score,
                record.run_id,
                record.recorded_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn list(&self, key: &SourceKey, limit: usize) -> Result<Vec<PostRecord>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Persistence(e.to_string()))?;
        let mut stmt = conn.prepare(
            "SELECT item_id, day_ts, timestamp, context, score, run_id, recorded_at
             FROM post_scores
             WHERE platform = ?1 AND source = ?2
             ORDER BY timestamp DESC, item_id ASC
             LIMIT ?3",
        )?;
        let rows = stmt.query_map(
            params![key.platform.to_string(), key.source, limit as i64],
            Self::row_to_record,
        )?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}
