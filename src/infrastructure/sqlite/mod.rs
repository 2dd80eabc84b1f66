pub mod cache_repo;
pub mod migrations;
pub mod post_repo;

use crate::domain::error::DomainError;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Connection shared by both stores. A single handle keeps `:memory:`
/// databases visible to every repository.
pub type SharedConnection = Arc<Mutex<Connection>>;

/// Opens `db_path`, enables WAL for file databases and applies migrations.
pub fn open(db_path: &str) -> Result<SharedConnection, DomainError> {
    let conn = Connection::open(db_path).map_err(|e| DomainError::Persistence(format!("DB error: {e}")))?;
    if db_path != ":memory:" {
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DomainError::Persistence(format!("WAL error: {e}")))?;
    }
    migrations::run_migrations(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}
