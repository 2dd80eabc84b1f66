use super::platform::Platform;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one queryable source: a subreddit, a hashtag or a search term on a platform.
/// Cache slots and per-item records are stored under this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceKey {
    pub platform: Platform,
    pub source: String,
}

impl SourceKey {
    pub fn new(platform: Platform, source: impl Into<String>) -> Result<Self, String> {
        let source = normalize(platform, &source.into());
        if source.is_empty() {
            return Err(format!("Empty {} for {platform}", platform.source_label()));
        }
        Ok(Self { platform, source })
    }
}

/// Strips the decorations people type (`r/`, `#`) so `r/rust` and `rust` share a cache.
fn normalize(platform: Platform, raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = match platform {
        Platform::Reddit => trimmed
            .strip_prefix("/r/")
            .or_else(|| trimmed.strip_prefix("r/"))
            .unwrap_or(trimmed),
        Platform::Twitter => trimmed.trim_start_matches('#'),
        Platform::YouTube => trimmed,
    };
    stripped.to_string()
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.platform, self.source)
    }
}
