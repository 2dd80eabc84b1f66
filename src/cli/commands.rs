use crate::domain::error::DomainError;
use crate::domain::values::platform::Platform;
use crate::domain::values::source_key::SourceKey;
use crate::domain::values::time_window::TimeWindow;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "jester", about = "Day-by-day social media sentiment for a subreddit, hashtag or search term")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch, score and cache sentiment for every day of a window
    Collect {
        #[command(flatten)]
        source: SourceSelector,
        /// Window start: unix seconds, YYYY-MM-DD or RFC3339 (must be midnight UTC)
        #[arg(long)]
        start: String,
        /// Window end (exclusive)
        #[arg(long)]
        end: String,
    },
    /// Show cached day values without calling any platform
    Cached {
        #[command(flatten)]
        source: SourceSelector,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// List stored per-item scores
    Posts {
        #[command(flatten)]
        source: SourceSelector,
        #[arg(long, default_value = "50")]
        limit: usize,
    },
}

/// Exactly one source flag.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct SourceSelector {
    /// Subreddit name
    #[arg(long)]
    pub reddit: Option<String>,
    /// Twitter/X hashtag
    #[arg(long)]
    pub hashtag: Option<String>,
    /// YouTube search term
    #[arg(long)]
    pub search: Option<String>,
}

impl SourceSelector {
    pub fn resolve(&self) -> Result<(Platform, &str), String> {
        match (&self.reddit, &self.hashtag, &self.search) {
            (Some(sub), None, None) => Ok((Platform::Reddit, sub.as_str())),
            (None, Some(tag), None) => Ok((Platform::Twitter, tag.as_str())),
            (None, None, Some(term)) => Ok((Platform::YouTube, term.as_str())),
            _ => Err("Pass exactly one of --reddit, --hashtag, --search".into()),
        }
    }

    pub fn key(&self) -> Result<SourceKey, DomainError> {
        let (platform, name) = self.resolve().map_err(DomainError::InvalidInput)?;
        SourceKey::new(platform, name).map_err(DomainError::InvalidInput)
    }
}

/// A command whose source, window and limit have been checked.
#[derive(Debug)]
pub enum Request {
    Collect { key: SourceKey, window: TimeWindow },
    Cached { key: SourceKey, window: TimeWindow },
    Posts { key: SourceKey, limit: usize },
}

impl Commands {
    /// Checks every argument without touching the store or any platform.
    pub fn validate(self, day_length: i64) -> Result<Request, DomainError> {
        match self {
            Commands::Collect { source, start, end } => {
                let (key, window) = window_query(&source, &start, &end, day_length)?;
                Ok(Request::Collect { key, window })
            }
            Commands::Cached { source, start, end } => {
                let (key, window) = window_query(&source, &start, &end, day_length)?;
                Ok(Request::Cached { key, window })
            }
            Commands::Posts { source, limit } => {
                if limit == 0 {
                    return Err(DomainError::InvalidInput("--limit must be positive".into()));
                }
                Ok(Request::Posts {
                    key: source.key()?,
                    limit,
                })
            }
        }
    }
}

fn window_query(
    source: &SourceSelector,
    start: &str,
    end: &str,
    day_length: i64,
) -> Result<(SourceKey, TimeWindow), DomainError> {
    let key = source.key()?;
    let start = parse_timestamp(start).map_err(DomainError::InvalidInput)?;
    let end = parse_timestamp(end).map_err(DomainError::InvalidInput)?;
    let window = TimeWindow::with_day_length(start, end, day_length)?;
    Ok((key, window))
}

/// Unix seconds, `YYYY-MM-DD` (midnight UTC) or RFC3339.
pub fn parse_timestamp(s: &str) -> Result<i64, String> {
    let s = s.trim();
    if let Ok(ts) = s.parse::<i64>() {
        return Ok(ts);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Ok(dt.timestamp());
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let dt = date.and_time(chrono::NaiveTime::MIN);
        return Ok(chrono::DateTime::<chrono::Utc>::from_naive_utc_and_offset(dt, chrono::Utc).timestamp());
    }
    Err(format!("Invalid timestamp: {s}. Use unix seconds, YYYY-MM-DD or RFC3339"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_timestamp("1704067200").unwrap(), 1_704_067_200);
        assert_eq!(parse_timestamp("2024-01-01").unwrap(), 1_704_067_200);
        assert_eq!(parse_timestamp("2024-01-01T01:00:00+01:00").unwrap(), 1_704_067_200);
        assert!(parse_timestamp("last tuesday").is_err());
    }

    #[test]
    fn test_selector_requires_exactly_one() {
        let cli = Cli::try_parse_from(["jester", "posts", "--reddit", "rust"]).unwrap();
        let Commands::Posts { source, limit } = cli.command else {
            panic!("expected posts");
        };
        assert_eq!(source.resolve().unwrap(), (Platform::Reddit, "rust"));
        assert_eq!(limit, 50);

        assert!(Cli::try_parse_from(["jester", "posts"]).is_err());
        assert!(Cli::try_parse_from(["jester", "posts", "--reddit", "a", "--hashtag", "b"]).is_err());
    }

    #[test]
    fn test_validate_builds_window() {
        let cli = Cli::try_parse_from([
            "jester", "collect", "--hashtag", "#rustlang", "--start", "2024-01-01", "--end", "2024-01-03",
        ])
        .unwrap();
        let Request::Collect { key, window } = cli.command.validate(86_400).unwrap() else {
            panic!("expected collect");
        };
        assert_eq!(key.source, "rustlang");
        assert_eq!(window.num_days(), 2);
    }

    #[test]
    fn test_validate_rejects_bad_arguments() {
        let reversed = Cli::try_parse_from([
            "jester", "cached", "--reddit", "rust", "--start", "2024-01-03", "--end", "2024-01-01",
        ])
        .unwrap();
        assert!(matches!(reversed.command.validate(86_400), Err(DomainError::InvalidWindow(_))));

        let huge = Cli::try_parse_from([
            "jester", "collect", "--reddit", "rust", "--start=-9223372036854775808", "--end", "0",
        ])
        .unwrap();
        assert!(matches!(huge.command.validate(86_400), Err(DomainError::InvalidWindow(_))));

        let no_limit = Cli::try_parse_from(["jester", "posts", "--reddit", "rust", "--limit", "0"]).unwrap();
        assert!(matches!(no_limit.command.validate(86_400), Err(DomainError::InvalidInput(_))));
    }
}
