use crate::domain::error::DomainError;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), DomainError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS day_sentiments (
            platform TEXT NOT NULL,
            source TEXT NOT NULL,
            day_length INTEGER NOT NULL,
            day_ts INTEGER NOT NULL,
            score REAL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (platform, source, day_length, day_ts)
        );

        CREATE TABLE IF NOT EXISTS post_scores (
            platform TEXT NOT NULL,
            source TEXT NOT NULL,
            item_id TEXT NOT NULL,
            day_ts INTEGER NOT NULL,
            timestamp INTEGER NOT NULL,
            context TEXT,
            score REAL NOT NULL,
            run_id TEXT NOT NULL,
            recorded_at TEXT NOT NULL,
            PRIMARY KEY (platform, source, item_id)
        );

        CREATE INDEX IF NOT EXISTS idx_post_scores_timestamp ON post_scores(platform, source, timestamp);
        ",
    )
    .map_err(|e| DomainError::Persistence(format!("Migration failed: {e}")))
}
