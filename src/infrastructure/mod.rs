pub mod feeds;
pub mod scoring;
pub mod sqlite;
