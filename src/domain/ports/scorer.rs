use crate::domain::entities::item::Item;
use crate::domain::error::DomainError;
use std::ops::RangeInclusive;

/// Scores a run accepts. `-1` marks a day without data in reports, so nothing
/// below zero may be aggregated.
pub const SCORE_RANGE: RangeInclusive<f64> = 0.0..=100.0;

/// Sentiment scoring port.
///
/// Higher is more positive. Values outside [`SCORE_RANGE`] are dropped by the pipeline.
#[async_trait::async_trait]
pub trait Scorer: Send + Sync {
    /// Score `item` given its thread context, nearest ancestor first.
    async fn score(&self, item: &Item, context: &[&Item]) -> Result<f64, DomainError>;

    /// Scorer name for logging.
    fn name(&self) -> &str;
}
