pub mod feed_adapter;
pub mod scorer;
pub mod sentiment_store;
