//! Reddit subreddit feed over the OAuth API (script-app password grant).

use super::send_json;
use crate::config::RedditCredentials;
use crate::domain::entities::item::Item;
use crate::domain::ports::feed_adapter::{Cursor, FeedAdapter, FeedError, Page, ReplyFetcher};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Comment ids per `/api/morechildren` call.
const MORE_BATCH: usize = 100;
/// Upper bound on `/api/morechildren` calls for one submission.
const MAX_MORE_CALLS: usize = 50;

pub struct RedditFeed {
    client: reqwest::Client,
    subreddit: String,
    credentials: RedditCredentials,
    page_size: u32,
    /// Token endpoint host
    auth_url: String,
    /// OAuth API host
    api_url: String,
    token: OnceCell<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Listing<T> {
    data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
struct ListingData<T> {
    #[serde(default = "Vec::new")]
    children: Vec<Thing<T>>,
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Thing<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenResponse {
    json: MoreChildrenBody,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenBody {
    #[serde(default)]
    errors: Vec<Value>,
    data: Option<MoreChildrenData>,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenData {
    #[serde(default)]
    things: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct LinkData {
    name: String,
    created_utc: f64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    num_comments: Option<u64>,
    score: Option<i64>,
    permalink: Option<String>,
}

impl RedditFeed {
    pub fn new(client: reqwest::Client, subreddit: String, credentials: RedditCredentials, page_size: u32) -> Self {
        Self {
            client,
            subreddit,
            credentials,
            page_size,
            auth_url: "https://www.reddit.com".into(),
            api_url: "https://oauth.reddit.com".into(),
            token: OnceCell::new(),
        }
    }

    pub fn with_base_urls(mut self, auth_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self.api_url = api_url.into();
        self
    }

    /// Access token, fetched once per feed.
    async fn token(&self) -> Result<&str, FeedError> {
        self.token
            .get_or_try_init(|| self.fetch_token())
            .await
            .map(String::as_str)
    }

    async fn fetch_token(&self) -> Result<String, FeedError> {
        let request = self
            .client
            .post(format!("{}/api/v1/access_token", self.auth_url))
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ]);
        let resp: TokenResponse = send_json(request).await?;
        match (resp.access_token, resp.error) {
            (Some(token), _) => {
                debug!(user = %self.credentials.username, "reddit token acquired");
                Ok(token)
            }
            (None, Some(error)) => Err(FeedError::Auth(format!("token exchange rejected: {error}"))),
            (None, None) => Err(FeedError::Auth("token response had no access_token".into())),
        }
    }

    /// Comments hidden behind `more` stubs, returned flat with their parent ids.
    async fn more_children(&self, token: &str, link_id: &str, ids: &[String]) -> Result<Vec<Value>, FeedError> {
        let children = ids.join(",");
        let request = self
            .client
            .get(format!("{}/api/morechildren", self.api_url))
            .bearer_auth(token)
            .query(&[
                ("api_type", "json"),
                ("link_id", link_id),
                ("children", children.as_str()),
                ("raw_json", "1"),
            ]);
        let resp: MoreChildrenResponse = send_json(request).await?;
        if !resp.json.errors.is_empty() {
            return Err(FeedError::Parse(format!("morechildren rejected: {:?}", resp.json.errors)));
        }
        Ok(resp.json.data.map(|d| d.things).unwrap_or_default())
    }

    fn link_to_item(link: LinkData) -> Item {
        let text = if link.selftext.is_empty() {
            link.title.clone()
        } else {
            format!("{}\n\n{}", link.title, link.selftext)
        };
        let mut item = Item::post(link.name, link.created_utc as i64, text).with_metadata(serde_json::json!({
            "title": link.title,
            "score": link.score,
            "permalink": link.permalink,
        }));
        item.reply_count = link.num_comments;
        item
    }
}

#[async_trait::async_trait]
impl FeedAdapter for RedditFeed {
    fn name(&self) -> &str {
        "reddit"
    }

    async fn next_page(&self, cursor: Option<&Cursor>) -> Result<Page, FeedError> {
        let token = self.token().await?;
        let limit = self.page_size.to_string();
        let mut query: Vec<(&str, &str)> = vec![("limit", limit.as_str()), ("raw_json", "1")];
        if let Some(after) = cursor {
            query.push(("after", after.as_str()));
        }

        let request = self
            .client
            .get(format!("{}/r/{}/new", self.api_url, self.subreddit))
            .bearer_auth(token)
            .query(&query);
        let listing: Listing<LinkData> = send_json(request).await?;

        let items: Vec<Item> = listing
            .data
            .children
            .into_iter()
            .map(|thing| Self::link_to_item(thing.data))
            .collect();
        Ok(Page::new(items, listing.data.after.map(Cursor::from)))
    }
}

#[async_trait::async_trait]
impl ReplyFetcher for RedditFeed {
    async fn fetch_replies(&self, item: &Item) -> Result<Vec<Item>, FeedError> {
        let token = self.token().await?;
        let article = item.id.strip_prefix("t3_").unwrap_or(&item.id);
        let request = self
            .client
            .get(format!("{}/comments/{}", self.api_url, article))
            .bearer_auth(token)
            .query(&[("raw_json", "1"), ("limit", "500")]);

        // [submission listing, comment listing]
        let listings: Vec<Value> = send_json(request).await?;
        let children = listings
            .get(1)
            .and_then(|l| l["data"]["children"].as_array())
            .ok_or_else(|| FeedError::Parse(format!("no comment listing for {}", item.id)))?;

        let mut out = Vec::new();
        let mut pending = Vec::new();
        flatten_comments(children, &mut out, &mut pending);

        // Expand `more` stubs until none are left; expanded batches can carry stubs of their own.
        let link_id = format!("t3_{article}");
        let mut requested: HashSet<String> = HashSet::new();
        let mut calls = 0;
        pending.retain(|id| requested.insert(id.clone()));
        while !pending.is_empty() {
            if calls == MAX_MORE_CALLS {
                warn!(item = %item.id, left = pending.len(), "giving up on remaining hidden comments");
                break;
            }
            calls += 1;
            let batch: Vec<String> = pending.drain(..pending.len().min(MORE_BATCH)).collect();
            let things = self.more_children(token, &link_id, &batch).await?;
            let mut found = Vec::new();
            flatten_comments(&things, &mut out, &mut found);
            pending.extend(found.into_iter().filter(|id| requested.insert(id.clone())));
        }
        debug!(item = %item.id, comments = out.len(), more_calls = calls, "reddit comments fetched");
        Ok(out)
    }
}

/// Depth-first walk of a comment tree. Ids listed by `more` stubs are
/// collected into `more` for a later `/api/morechildren` call.
fn flatten_comments(children: &[Value], out: &mut Vec<Item>, more: &mut Vec<String>) {
    for child in children {
        match child["kind"].as_str() {
            Some("t1") => {}
            Some("more") => {
                if let Some(ids) = child["data"]["children"].as_array() {
                    more.extend(ids.iter().filter_map(Value::as_str).map(str::to_string));
                }
                continue;
            }
            _ => continue,
        }
        let data = &child["data"];
        let (Some(name), Some(parent)) = (data["name"].as_str(), data["parent_id"].as_str()) else {
            continue;
        };
        let created = data["created_utc"].as_f64().unwrap_or_default() as i64;
        let body = data["body"].as_str().unwrap_or_default();
        out.push(
            Item::comment(name, created, parent, body).with_metadata(serde_json::json!({
                "score": data["score"],
                "author": data["author"],
            })),
        );

        // `replies` is "" for leaf comments and a listing otherwise.
        if let Some(nested) = data["replies"]["data"]["children"].as_array() {
            flatten_comments(nested, out, more);
        }
    }
}
