pub mod day_sentiment;
pub mod platform;
pub mod source_key;
pub mod time_window;
