//! YouTube search-term feed over the Data API v3.
//!
//! Videos are the posts; comment threads and their replies are the replies.

use super::{parse_rfc3339, send_json};
use crate::domain::entities::item::Item;
use crate::domain::ports::feed_adapter::{Cursor, FeedAdapter, FeedError, Page, ReplyFetcher};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

const VIDEO_PREFIX: &str = "yt_video_";
const COMMENT_PREFIX: &str = "yt_comment_";
const REPLY_PREFIX: &str = "yt_reply_";

pub struct YouTubeFeed {
    client: reqwest::Client,
    search_term: String,
    api_key: String,
    page_size: u32,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: SearchId,
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    kind: String,
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    published_at: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    channel_title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoStats>,
}

#[derive(Debug, Deserialize)]
struct VideoStats {
    id: String,
    statistics: Option<Statistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    /// The API encodes counts as strings.
    comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadsResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    id: String,
    snippet: ThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadSnippet {
    top_level_comment: Comment,
    #[serde(default)]
    total_reply_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentsResponse {
    #[serde(default)]
    items: Vec<Comment>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Comment {
    id: String,
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    #[serde(default)]
    text_display: String,
    published_at: String,
    parent_id: Option<String>,
    author_display_name: Option<String>,
    #[serde(default)]
    like_count: u64,
}

impl YouTubeFeed {
    pub fn new(client: reqwest::Client, search_term: String, api_key: String, page_size: u32) -> Self {
        Self {
            client,
            search_term,
            api_key,
            page_size,
            base_url: "https://www.googleapis.com/youtube/v3".into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Comment counts keyed by video id. Videos missing from the response are absent.
    async fn comment_counts(&self, video_ids: &[&str]) -> Result<HashMap<String, u64>, FeedError> {
        let ids = video_ids.join(",");
        let request = self
            .client
            .get(format!("{}/videos", self.base_url))
            .query(&[("part", "statistics"), ("id", ids.as_str()), ("key", self.api_key.as_str())]);
        let resp: VideosResponse = send_json(request).await?;
        Ok(resp
            .items
            .into_iter()
            .filter_map(|v| {
                let count = v.statistics?.comment_count?.parse::<u64>().ok()?;
                Some((v.id, count))
            })
            .collect())
    }

    async fn thread_page(&self, video_id: &str, page_token: Option<&str>) -> Result<ThreadsResponse, FeedError> {
        let mut params = vec![
            ("part", "snippet"),
            ("videoId", video_id),
            ("maxResults", "100"),
            ("textFormat", "plainText"),
            ("key", self.api_key.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }
        let request = self.client.get(format!("{}/commentThreads", self.base_url)).query(&params);
        send_json(request).await
    }

    async fn reply_page(&self, parent_id: &str, page_token: Option<&str>) -> Result<CommentsResponse, FeedError> {
        let mut params = vec![
            ("part", "snippet"),
            ("parentId", parent_id),
            ("maxResults", "100"),
            ("textFormat", "plainText"),
            ("key", self.api_key.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }
        let request = self.client.get(format!("{}/comments", self.base_url)).query(&params);
        send_json(request).await
    }

    fn comment_to_item(comment: Comment, id: String, parent: String) -> Option<Item> {
        let Some(created_at) = parse_rfc3339(&comment.snippet.published_at) else {
            warn!(comment = %comment.id, "comment with unparseable publishedAt, skipping");
            return None;
        };
        Some(
            Item::comment(id, created_at, parent, comment.snippet.text_display).with_metadata(serde_json::json!({
                "author": comment.snippet.author_display_name,
                "like_count": comment.snippet.like_count,
            })),
        )
    }
}

#[async_trait::async_trait]
impl FeedAdapter for YouTubeFeed {
    fn name(&self) -> &str {
        "youtube"
    }

    async fn next_page(&self, cursor: Option<&Cursor>) -> Result<Page, FeedError> {
        let max_results = self.page_size.clamp(1, 50).to_string();
        let mut params = vec![
            ("part", "snippet"),
            ("q", self.search_term.as_str()),
            ("type", "video"),
            ("order", "date"),
            ("maxResults", max_results.as_str()),
            ("key", self.api_key.as_str()),
        ];
        if let Some(token) = cursor {
            params.push(("pageToken", token.as_str()));
        }
        let request = self.client.get(format!("{}/search", self.base_url)).query(&params);
        let resp: SearchResponse = send_json(request).await?;

        let videos: Vec<(String, SearchResult)> = resp
            .items
            .into_iter()
            .filter(|r| r.id.kind == "youtube#video")
            .filter_map(|r| r.id.video_id.clone().map(|id| (id, r)))
            .collect();

        // Without statistics the reply count is unknown and every video is expanded.
        let ids: Vec<&str> = videos.iter().map(|(id, _)| id.as_str()).collect();
        let counts = if ids.is_empty() {
            HashMap::new()
        } else {
            match self.comment_counts(&ids).await {
                Ok(counts) => counts,
                Err(e) => {
                    warn!(error = %e, "video statistics unavailable");
                    HashMap::new()
                }
            }
        };

        let mut items = Vec::with_capacity(videos.len());
        for (video_id, result) in videos {
            let Some(created_at) = parse_rfc3339(&result.snippet.published_at) else {
                warn!(video = %video_id, "video with unparseable publishedAt, skipping");
                continue;
            };
            let text = format!("{}\n\n{}", result.snippet.title, result.snippet.description);
            let mut item = Item::post(format!("{VIDEO_PREFIX}{video_id}"), created_at, text.trim().to_string())
                .with_metadata(serde_json::json!({
                    "video_id": video_id,
                    "channel_title": result.snippet.channel_title,
                }));
            item.reply_count = counts.get(&video_id).copied();
            items.push(item);
        }

        Ok(Page::new(items, resp.next_page_token.map(Cursor::from)))
    }
}

#[async_trait::async_trait]
impl ReplyFetcher for YouTubeFeed {
    async fn fetch_replies(&self, item: &Item) -> Result<Vec<Item>, FeedError> {
        let Some(video_id) = item.id.strip_prefix(VIDEO_PREFIX) else {
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        let mut threads_token: Option<String> = None;
        loop {
            let page = self.thread_page(video_id, threads_token.as_deref()).await?;
            for thread in page.items {
                let thread_id = format!("{COMMENT_PREFIX}{}", thread.id);
                let has_replies = thread.snippet.total_reply_count > 0;
                if let Some(top) = Self::comment_to_item(thread.snippet.top_level_comment, thread_id, item.id.clone()) {
                    out.push(top);
                }
                if !has_replies {
                    continue;
                }

                let mut replies_token: Option<String> = None;
                loop {
                    let replies = self.reply_page(&thread.id, replies_token.as_deref()).await?;
                    for reply in replies.items {
                        let parent = reply.snippet.parent_id.clone().unwrap_or_else(|| thread.id.clone());
                        let id = format!("{REPLY_PREFIX}{}", reply.id);
                        out.extend(Self::comment_to_item(reply, id, format!("{COMMENT_PREFIX}{parent}")));
                    }
                    replies_token = replies.next_page_token;
                    if replies_token.is_none() {
                        break;
                    }
                }
            }
            threads_token = page.next_page_token;
            if threads_token.is_none() {
                break;
            }
        }
        Ok(out)
    }
}
