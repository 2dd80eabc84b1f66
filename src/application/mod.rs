pub mod aggregate;
pub mod buckets;
pub mod cached_sentiment;
pub mod collect_sentiment;
pub mod merge;
pub mod paginate;
pub mod retry;
pub mod threads;
