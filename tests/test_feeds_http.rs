//! Platform adapters against a local mock server.

use jester::config::RedditCredentials;
use jester::domain::error::DomainError;
use jester::domain::entities::item::{Item, ItemKind};
use jester::domain::ports::feed_adapter::{Cursor, FeedAdapter, FeedError, ReplyFetcher};
use jester::domain::ports::scorer::Scorer;
use jester::infrastructure::feeds::reddit::RedditFeed;
use jester::infrastructure::feeds::twitter::TwitterFeed;
use jester::infrastructure::feeds::youtube::YouTubeFeed;
use jester::infrastructure::scoring::ollama::OllamaScorer;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn creds() -> RedditCredentials {
    RedditCredentials {
        client_id: "id".into(),
        client_secret: "secret".into(),
        username: "bot".into(),
        password: "pw".into(),
    }
}

fn reddit(server: &MockServer) -> RedditFeed {
    RedditFeed::new(reqwest::Client::new(), "rust".into(), creds(), 25).with_base_urls(server.uri(), server.uri())
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok", "token_type": "bearer"})))
        .expect(1)
        .mount(server)
        .await;
}

fn link(name: &str, created: f64, comments: u64) -> serde_json::Value {
    json!({"kind": "t3", "data": {
        "name": name, "created_utc": created, "title": format!("title {name}"),
        "selftext": "", "num_comments": comments, "score": 1, "permalink": "/r/rust/x"
    }})
}

#[tokio::test]
async fn test_reddit_pages_with_after_cursor() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/rust/new"))
        .and(header("authorization", "Bearer tok"))
        .and(query_param("after", "t3_b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "Listing",
            "data": {"children": [link("t3_c", 1_704_067_300.0, 0)], "after": null}
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/rust/new"))
        .and(query_param("limit", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "Listing",
            "data": {"children": [link("t3_a", 1_704_153_000.0, 2), link("t3_b", 1_704_100_000.0, 0)], "after": "t3_b"}
        })))
        .mount(&server)
        .await;

    let feed = reddit(&server);
    let first = feed.next_page(None).await.unwrap();
    let ids: Vec<&str> = first.items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["t3_a", "t3_b"]);
    assert_eq!(first.items[0].reply_count, Some(2));
    assert_eq!(first.items[0].created_at, 1_704_153_000);
    assert_eq!(first.next_cursor, Some(Cursor::from("t3_b")));

    let second = feed.next_page(first.next_cursor.as_ref()).await.unwrap();
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.next_cursor, None);
}

#[tokio::test]
async fn test_reddit_comment_tree_flattened() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/comments/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"kind": "Listing", "data": {"children": [link("t3_a", 1.0, 2)], "after": null}},
            {"kind": "Listing", "data": {"children": [
                {"kind": "t1", "data": {
                    "name": "t1_x", "parent_id": "t3_a", "created_utc": 10.0, "body": "first",
                    "replies": {"kind": "Listing", "data": {"children": [
                        {"kind": "t1", "data": {"name": "t1_y", "parent_id": "t1_x", "created_utc": 20.0, "body": "second", "replies": ""}}
                    ]}}
                }},
                {"kind": "more", "data": {"count": 3, "children": ["z1", "z2"]}}
            ], "after": null}}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/morechildren"))
        .and(query_param("link_id", "t3_a"))
        .and(query_param("children", "z1,z2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"json": {"errors": [], "data": {"things": [
            {"kind": "t1", "data": {"name": "t1_z1", "parent_id": "t3_a", "created_utc": 30.0, "body": "late", "replies": ""}},
            {"kind": "t1", "data": {"name": "t1_z2", "parent_id": "t1_x", "created_utc": 40.0, "body": "later", "replies": ""}},
            {"kind": "more", "data": {"count": 1, "children": ["z3"]}}
        ]}}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/morechildren"))
        .and(query_param("children", "z3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"json": {"errors": [], "data": {"things": [
            {"kind": "t1", "data": {"name": "t1_z3", "parent_id": "t1_z2", "created_utc": 50.0, "body": "latest", "replies": ""}}
        ]}}})))
        .expect(1)
        .mount(&server)
        .await;

    let feed = reddit(&server);
    let replies = feed.fetch_replies(&Item::post("t3_a", 1, "post")).await.unwrap();
    let ids: Vec<&str> = replies.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["t1_x", "t1_y", "t1_z1", "t1_z2", "t1_z3"]);
    assert_eq!(replies[1].parent_id.as_deref(), Some("t1_x"));
    assert_eq!(replies[1].kind, ItemKind::Comment);
    assert_eq!(replies[4].parent_id.as_deref(), Some("t1_z2"));
}

#[tokio::test]
async fn test_reddit_more_children_failure_is_an_error() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/comments/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"kind": "Listing", "data": {"children": [link("t3_a", 1.0, 4)], "after": null}},
            {"kind": "Listing", "data": {"children": [
                {"kind": "more", "data": {"count": 4, "children": ["q1"]}}
            ], "after": null}}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/morechildren"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = reddit(&server).fetch_replies(&Item::post("t3_a", 1, "post")).await.unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_reddit_rejected_grant_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&server)
        .await;

    let err = reddit(&server).next_page(None).await.unwrap_err();
    assert!(matches!(err, FeedError::Auth(ref m) if m.contains("invalid_grant")));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_server_error_is_retryable() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/r/rust/new"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = reddit(&server).next_page(None).await.unwrap_err();
    assert!(matches!(err, FeedError::Http { status: 503, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_twitter_search_and_conversation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .and(header("authorization", "Bearer bearer"))
        .and(query_param("query", "#rustlang -is:retweet"))
        .and(query_param("max_results", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "1", "text": "shipping today", "created_at": "2024-01-02T10:00:00.000Z",
                "conversation_id": "1", "public_metrics": {"reply_count": 1, "like_count": 3, "retweet_count": 0}
            }],
            "meta": {"result_count": 1, "next_token": "n1"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .and(query_param("query", "conversation_id:1 is:reply"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "2", "text": "congrats", "created_at": "2024-01-02T11:00:00.000Z",
                "conversation_id": "1", "referenced_tweets": [{"type": "replied_to", "id": "1"}]
            }],
            "meta": {"result_count": 1}
        })))
        .mount(&server)
        .await;

    let feed = TwitterFeed::new(reqwest::Client::new(), "rustlang".into(), "bearer".into(), 25).with_base_url(server.uri());
    let page = feed.next_page(None).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, "tw_1");
    assert_eq!(page.items[0].created_at, 1_704_189_600);
    assert_eq!(page.next_cursor, Some(Cursor::from("n1")));

    let replies = feed.fetch_replies(&page.items[0]).await.unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].parent_id.as_deref(), Some("tw_1"));
}

#[tokio::test]
async fn test_youtube_videos_comments_and_replies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust"))
        .and(query_param("order", "date"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": {"kind": "youtube#video", "videoId": "v1"},
                 "snippet": {"publishedAt": "2024-01-01T05:00:00Z", "title": "Rust 2024", "description": "news", "channelTitle": "c"}},
                {"id": {"kind": "youtube#channel", "channelId": "ch"},
                 "snippet": {"publishedAt": "2024-01-01T04:00:00Z", "title": "a channel"}}
            ],
            "nextPageToken": "NEXT"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "v1", "statistics": {"commentCount": "2", "viewCount": "10"}}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("videoId", "v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "th1",
                "snippet": {
                    "totalReplyCount": 1,
                    "topLevelComment": {"id": "th1", "snippet": {
                        "textDisplay": "nice", "publishedAt": "2024-01-01T06:00:00Z", "authorDisplayName": "a", "likeCount": 1
                    }}
                }
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/comments"))
        .and(query_param("parentId", "th1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "th1.r1", "snippet": {
                "textDisplay": "agreed", "publishedAt": "2024-01-01T07:00:00Z", "parentId": "th1", "likeCount": 0
            }}]
        })))
        .mount(&server)
        .await;

    let feed = YouTubeFeed::new(reqwest::Client::new(), "rust".into(), "key".into(), 25).with_base_url(server.uri());
    let page = feed.next_page(None).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, "yt_video_v1");
    assert_eq!(page.items[0].reply_count, Some(2));
    assert_eq!(page.next_cursor, Some(Cursor::from("NEXT")));

    let replies = feed.fetch_replies(&page.items[0]).await.unwrap();
    let pairs: Vec<(&str, Option<&str>)> = replies.iter().map(|i| (i.id.as_str(), i.parent_id.as_deref())).collect();
    assert_eq!(
        pairs,
        vec![
            ("yt_comment_th1", Some("yt_video_v1")),
            ("yt_reply_th1.r1", Some("yt_comment_th1")),
        ]
    );
}

#[tokio::test]
async fn test_ollama_scorer_reads_last_number() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({"model": "tiny", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "tiny", "response": "<think>maybe 20 or 90</think> 77", "done": true
        })))
        .mount(&server)
        .await;

    let scorer = OllamaScorer::new(server.uri(), "tiny".into());
    let score = scorer.score(&Item::post("p", 0, "love it"), &[]).await.unwrap();
    assert_eq!(score, 77.0);
}

#[tokio::test]
async fn test_ollama_scorer_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;

    let scorer = OllamaScorer::new(server.uri(), "tiny".into());
    let err = scorer.score(&Item::post("p", 0, "x"), &[]).await.unwrap_err();
    assert!(matches!(err, DomainError::Scoring(ref m) if m.contains("500")));
}
