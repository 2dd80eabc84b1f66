pub mod empty;
pub mod reddit;
pub mod twitter;
pub mod youtube;

use crate::config::JesterConfig;
use crate::domain::error::DomainError;
use crate::domain::ports::feed_adapter::{FeedAdapter, FeedError, ReplyFetcher};
use crate::domain::values::platform::Platform;
use crate::domain::values::source_key::SourceKey;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use self::empty::EmptyFeed;
use self::reddit::RedditFeed;
use self::twitter::TwitterFeed;
use self::youtube::YouTubeFeed;

/// The two halves of a platform binding for one source.
pub struct SourceAdapters {
    pub feed: Arc<dyn FeedAdapter>,
    pub replies: Arc<dyn ReplyFetcher>,
}

impl SourceAdapters {
    fn from_client<T: FeedAdapter + ReplyFetcher + 'static>(client: T) -> Self {
        let client = Arc::new(client);
        Self {
            feed: client.clone(),
            replies: client,
        }
    }
}

/// Adapters for `key`. Missing credentials give an empty feed so the run can
/// still answer from cache.
pub fn build_source(key: &SourceKey, config: &JesterConfig) -> SourceAdapters {
    let client = http_client(&config.user_agent);
    match key.platform {
        Platform::Reddit => match &config.reddit {
            Some(creds) => SourceAdapters::from_client(RedditFeed::new(
                client,
                key.source.clone(),
                creds.clone(),
                config.page_size,
            )),
            None => missing(key, "REDDIT_CLIENT_ID, REDDIT_CLIENT_SECRET, REDDIT_USERNAME, REDDIT_PASSWORD"),
        },
        Platform::Twitter => match &config.x_bearer_token {
            Some(token) => SourceAdapters::from_client(TwitterFeed::new(
                client,
                key.source.clone(),
                token.clone(),
                config.page_size,
            )),
            None => missing(key, "X_BEARER_TOKEN"),
        },
        Platform::YouTube => match &config.youtube_key {
            Some(api_key) => SourceAdapters::from_client(YouTubeFeed::new(
                client,
                key.source.clone(),
                api_key.clone(),
                config.page_size,
            )),
            None => missing(key, "YT_KEY"),
        },
    }
}

fn missing(key: &SourceKey, vars: &str) -> SourceAdapters {
    let err = DomainError::AuthMissing(format!("{} needs {vars}", key.platform));
    warn!(source = %key, error = %err, "no credentials, serving cached days only");
    SourceAdapters::from_client(EmptyFeed::new(key.platform.to_string()))
}

pub(crate) fn http_client(user_agent: &str) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_default()
}

/// Sends `request` and decodes a JSON body, classifying failures so the
/// retry helper can tell transient ones apart.
pub(crate) async fn send_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, FeedError> {
    let resp = request
        .send()
        .await
        .map_err(|e| FeedError::Network(e.to_string()))?;

    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        let body = resp.text().await.unwrap_or_default();
        return Err(FeedError::Auth(format!("{status}: {}", truncate(&body))));
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(FeedError::Http {
            status: status.as_u16(),
            message: truncate(&body),
        });
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| FeedError::Network(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| FeedError::Parse(e.to_string()))
}

fn truncate(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// Parses an RFC3339 timestamp into unix seconds.
pub(crate) fn parse_rfc3339(raw: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.timestamp())
}
