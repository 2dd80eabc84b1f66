use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Subreddit submissions and their comment trees
    Reddit,
    /// Hashtag search results and conversation replies
    Twitter,
    /// Search-term video results and their comment threads
    YouTube,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Reddit, Platform::Twitter, Platform::YouTube];

    /// What the source identifier means on this platform.
    pub fn source_label(&self) -> &'static str {
        match self {
            Self::Reddit => "subreddit",
            Self::Twitter => "hashtag",
            Self::YouTube => "search term",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reddit => write!(f, "reddit"),
            Self::Twitter => write!(f, "twitter"),
            Self::YouTube => write!(f, "youtube"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reddit" => Ok(Self::Reddit),
            "twitter" | "x" => Ok(Self::Twitter),
            "youtube" | "yt" => Ok(Self::YouTube),
            _ => Err(format!(
                "Invalid platform: '{}'. Use 'reddit', 'twitter' or 'youtube'",
                s
            )),
        }
    }
}
