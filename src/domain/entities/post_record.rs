use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored score of a single item, written once per run that scored it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    pub item_id: String,
    /// Day bucket the item was scored under.
    pub day: i64,
    /// Creation time of the item.
    pub timestamp: i64,
    /// Fullname of the parent item, if this was a reply.
    pub context: Option<String>,
    pub score: f64,
    pub run_id: String,
    pub recorded_at: DateTime<Utc>,
}

impl PostRecord {
    pub fn new(
        item_id: String,
        day: i64,
        timestamp: i64,
        context: Option<String>,
        score: f64,
        run_id: &str,
    ) -> Self {
        Self {
            item_id,
            day,
            timestamp,
            context,
            score,
            run_id: run_id.to_string(),
            recorded_at: Utc::now(),
        }
    }
}
