//! Twitter/X hashtag feed over the v2 recent-search endpoint (app bearer token).

use super::{parse_rfc3339, send_json};
use crate::domain::entities::item::Item;
use crate::domain::ports::feed_adapter::{Cursor, FeedAdapter, FeedError, Page, ReplyFetcher};
use serde::Deserialize;
use tracing::warn;

const TWEET_FIELDS: &str = "created_at,conversation_id,referenced_tweets,public_metrics,author_id";
/// Upper bound on reply pages fetched per conversation.
const MAX_REPLY_PAGES: usize = 4;

pub struct TwitterFeed {
    client: reqwest::Client,
    hashtag: String,
    bearer_token: String,
    page_size: u32,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Tweet>,
    meta: Option<SearchMeta>,
}

#[derive(Debug, Deserialize)]
struct SearchMeta {
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: String,
    text: String,
    created_at: Option<String>,
    conversation_id: Option<String>,
    author_id: Option<String>,
    #[serde(default)]
    referenced_tweets: Vec<ReferencedTweet>,
    public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Deserialize)]
struct ReferencedTweet {
    #[serde(rename = "type")]
    kind: String,
    id: String,
}

#[derive(Debug, Deserialize)]
struct PublicMetrics {
    #[serde(default)]
    reply_count: u64,
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    retweet_count: u64,
}

pub fn fullname(tweet_id: &str) -> String {
    format!("tw_{tweet_id}")
}

impl TwitterFeed {
    pub fn new(client: reqwest::Client, hashtag: String, bearer_token: String, page_size: u32) -> Self {
        Self {
            client,
            hashtag,
            bearer_token,
            page_size,
            base_url: "https://api.twitter.com".into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn search(&self, query: &str, next_token: Option<&str>) -> Result<SearchResponse, FeedError> {
        // The endpoint only accepts 10..=100.
        let max_results = self.page_size.clamp(10, 100).to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("query", query),
            ("max_results", max_results.as_str()),
            ("tweet.fields", TWEET_FIELDS),
        ];
        if let Some(token) = next_token {
            params.push(("next_token", token));
        }
        let request = self
            .client
            .get(format!("{}/2/tweets/search/recent", self.base_url))
            .bearer_auth(&self.bearer_token)
            .query(&params);
        send_json(request).await
    }

    fn tweet_to_item(tweet: Tweet) -> Option<Item> {
        let Some(created_at) = tweet.created_at.as_deref().and_then(parse_rfc3339) else {
            warn!(tweet = %tweet.id, "tweet without a usable created_at, skipping");
            return None;
        };
        let replied_to = tweet
            .referenced_tweets
            .iter()
            .find(|r| r.kind == "replied_to")
            .map(|r| fullname(&r.id));
        let metadata = serde_json::json!({
            "conversation_id": tweet.conversation_id,
            "author_id": tweet.author_id,
            "like_count": tweet.public_metrics.as_ref().map(|m| m.like_count),
            "retweet_count": tweet.public_metrics.as_ref().map(|m| m.retweet_count),
        });

        let id = fullname(&tweet.id);
        let mut item = match replied_to {
            Some(parent) => Item::comment(id, created_at, parent, tweet.text),
            None => Item::post(id, created_at, tweet.text),
        };
        item.reply_count = tweet.public_metrics.map(|m| m.reply_count);
        Some(item.with_metadata(metadata))
    }
}

#[async_trait::async_trait]
impl FeedAdapter for TwitterFeed {
    fn name(&self) -> &str {
        "twitter"
    }

    async fn next_page(&self, cursor: Option<&Cursor>) -> Result<Page, FeedError> {
        let query = format!("#{} -is:retweet", self.hashtag);
        let resp = self.search(&query, cursor.map(Cursor::as_str)).await?;
        let items = resp.data.into_iter().filter_map(Self::tweet_to_item).collect();
        let next = resp.meta.and_then(|m| m.next_token).map(Cursor::from);
        Ok(Page::new(items, next))
    }
}

#[async_trait::async_trait]
impl ReplyFetcher for TwitterFeed {
    async fn fetch_replies(&self, item: &Item) -> Result<Vec<Item>, FeedError> {
        let conversation = item
            .metadata
            .get("conversation_id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| item.id.trim_start_matches("tw_").to_string());
        let query = format!("conversation_id:{conversation} is:reply");

        let mut replies = Vec::new();
        let mut next: Option<String> = None;
        for _ in 0..MAX_REPLY_PAGES {
            let resp = self.search(&query, next.as_deref()).await?;
            replies.extend(resp.data.into_iter().filter_map(Self::tweet_to_item));
            next = resp.meta.and_then(|m| m.next_token);
            if next.is_none() {
                break;
            }
        }
        Ok(replies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_maps_parent() {
        let tweet: Tweet = serde_json::from_value(serde_json::json!({
            "id": "2",
            "text": "agreed",
            "created_at": "2024-01-01T12:00:00.000Z",
            "conversation_id": "1",
            "referenced_tweets": [{"type": "replied_to", "id": "1"}],
            "public_metrics": {"reply_count": 0, "like_count": 4}
        }))
        .unwrap();
        let item = TwitterFeed::tweet_to_item(tweet).unwrap();
        assert_eq!(item.id, "tw_2");
        assert_eq!(item.parent_id.as_deref(), Some("tw_1"));
        assert_eq!(item.created_at, 1_704_110_400);
        assert!(!item.may_have_replies());
    }

    #[test]
    fn test_missing_timestamp_skipped() {
        let tweet: Tweet = serde_json::from_value(serde_json::json!({"id": "3", "text": "?"})).unwrap();
        assert!(TwitterFeed::tweet_to_item(tweet).is_none());
    }
}
