use crate::application::aggregate::AggregatePolicy;
use crate::application::merge::SentimentCache;
use crate::application::paginate::{scan_window, PageLimits, StopReason};
use crate::application::retry::{retry_with_backoff, RetryPolicy};
use crate::application::threads::IdIndex;
use crate::domain::entities::item::Item;
use crate::domain::entities::post_record::PostRecord;
use crate::domain::ports::feed_adapter::{FeedAdapter, ReplyFetcher};
use crate::domain::ports::scorer::{Scorer, SCORE_RANGE};
use crate::domain::ports::sentiment_store::{CacheStore, PostStore};
use crate::domain::values::day_sentiment::DaySentiment;
use crate::domain::values::platform::Platform;
use crate::domain::values::source_key::SourceKey;
use crate::domain::values::time_window::{format_timestamp, TimeWindow};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Tunables of one collection run.
#[derive(Debug, Clone)]
pub struct CollectSettings {
    pub limits: PageLimits,
    pub retry: RetryPolicy,
    /// Upper bound on in-flight reply fetches, scorer calls and store writes.
    pub concurrency: usize,
    pub aggregate: AggregatePolicy,
    /// Log every scored item with its reply chain.
    pub debug: bool,
}

impl Default for CollectSettings {
    fn default() -> Self {
        Self {
            limits: PageLimits::default(),
            retry: RetryPolicy::default(),
            concurrency: 8,
            aggregate: AggregatePolicy::default(),
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentReport {
    pub run_id: String,
    pub platform: Platform,
    pub source: String,
    pub start: i64,
    pub end: i64,
    /// One entry per window day. Days without content serialize as `-1`.
    pub days: BTreeMap<i64, DaySentiment>,
    pub cached_days: usize,
    pub fetched_days: usize,
    pub items_scored: usize,
    pub pages_fetched: usize,
    pub stop_reason: StopReason,
}

pub struct CollectSentimentUseCase {
    cache_store: Arc<dyn CacheStore>,
    post_store: Arc<dyn PostStore>,
    scorer: Arc<dyn Scorer>,
    settings: CollectSettings,
}

impl CollectSentimentUseCase {
    pub fn new(
        cache_store: Arc<dyn CacheStore>,
        post_store: Arc<dyn PostStore>,
        scorer: Arc<dyn Scorer>,
        settings: CollectSettings,
    ) -> Self {
        Self {
            cache_store,
            post_store,
            scorer,
            settings,
        }
    }

    /// Per-day sentiment of `key` over `window`.
    ///
    /// Only validation can fail a run, and it happens before this is called:
    /// fetch, scoring and store failures degrade to missing data.
    pub async fn execute(
        &self,
        key: &SourceKey,
        window: &TimeWindow,
        feed: &dyn FeedAdapter,
        replies: &dyn ReplyFetcher,
    ) -> SentimentReport {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("collect", run = %run_id, source = %key);
        self.run(run_id, key, window, feed, replies).instrument(span).await
    }

    async fn run(
        &self,
        run_id: String,
        key: &SourceKey,
        window: &TimeWindow,
        feed: &dyn FeedAdapter,
        replies: &dyn ReplyFetcher,
    ) -> SentimentReport {
        let concurrency = self.settings.concurrency.max(1);
        info!(window = %window, feed = feed.name(), scorer = self.scorer.name(), "collection started");

        // The feed cannot skip by day, so it is always walked from the top.
        let scan = scan_window(feed, window, &self.settings.limits, &self.settings.retry).await;
        info!(
            pages = scan.pages_fetched,
            skipped = scan.pages_skipped,
            items = scan.buckets.total_items(),
            stop = ?scan.stop,
            "feed walk finished"
        );

        let mut cache = self.load_cache(key, window, concurrency).await;
        let fresh: BTreeSet<i64> = cache.uncached_days().into_iter().collect();
        debug!(cached = cache.cached_days().len(), fresh = fresh.len(), "cache loaded");

        // Cached days never trigger reply fetches.
        let targets: Vec<&Item> = scan
            .buckets
            .iter()
            .filter(|(day, _)| fresh.contains(day))
            .flat_map(|(_, items)| items.iter())
            .filter(|item| item.may_have_replies())
            .collect();
        let fetched = self.expand_replies(targets, replies, concurrency).await;

        let mut index = IdIndex::new();
        let mut to_score: Vec<(i64, String)> = Vec::new();
        let mut queued: HashSet<String> = HashSet::new();

        for (day, items) in scan.buckets.into_days() {
            for item in items {
                if fresh.contains(&day) && queued.insert(item.id.clone()) {
                    to_score.push((day, item.id.clone()));
                }
                index.insert(item);
            }
        }

        let mut dropped = 0usize;
        for reply in fetched.into_iter().flatten() {
            let Some(day) = window.bucket(reply.created_at) else {
                dropped += 1;
                continue;
            };
            if fresh.contains(&day) && queued.insert(reply.id.clone()) {
                to_score.push((day, reply.id.clone()));
            }
            index.insert(reply);
        }
        debug!(indexed = index.len(), queued = to_score.len(), dropped, "thread index built");

        if self.settings.debug {
            dump_threads(&index, &to_score);
        }

        let records = self.score_items(&index, &to_score, &run_id, concurrency).await;

        let mut by_day: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
        for record in &records {
            by_day.entry(record.day).or_default().push(record.score);
        }

        let mut computed: Vec<(i64, DaySentiment)> = Vec::with_capacity(fresh.len());
        for day in &fresh {
            let scores = by_day.get(day).map(Vec::as_slice).unwrap_or(&[]);
            let value = self.settings.aggregate.aggregate(scores);
            debug!(day = %format_timestamp(*day), items = scores.len(), value = %value, "day aggregated");
            cache.fill(*day, value);
            computed.push((*day, value));
        }

        self.persist(key, window.day_length(), &records, &computed, concurrency).await;

        let report = SentimentReport {
            run_id,
            platform: key.platform,
            source: key.source.clone(),
            start: window.start(),
            end: window.end(),
            cached_days: cache.cached_days().len(),
            fetched_days: fresh.len(),
            items_scored: records.len(),
            pages_fetched: scan.pages_fetched,
            stop_reason: scan.stop,
            days: cache.into_days(),
        };
        info!(
            cached = report.cached_days,
            fetched = report.fetched_days,
            scored = report.items_scored,
            "collection finished"
        );
        report
    }

    /// Cache read errors count as misses.
    async fn load_cache(&self, key: &SourceKey, window: &TimeWindow, concurrency: usize) -> SentimentCache {
        let store = self.cache_store.as_ref();
        let entries: Vec<(i64, Option<f64>)> = stream::iter(window.days())
            .map(|day| async move {
                match store.get(key, window.day_length(), day).await {
                    Ok(value) => (day, value),
                    Err(e) => {
                        warn!(day = %format_timestamp(day), error = %e, "cache read failed, treating day as uncached");
                        (day, None)
                    }
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;
        SentimentCache::from_entries(window, entries)
    }

    /// Reply trees of `targets`. A post whose replies cannot be fetched
    /// contributes nothing.
    async fn expand_replies(
        &self,
        targets: Vec<&Item>,
        replies: &dyn ReplyFetcher,
        concurrency: usize,
    ) -> Vec<Vec<Item>> {
        let retry = &self.settings.retry;
        stream::iter(targets)
            .map(|post| async move {
                let operation = format!("replies of {}", post.id);
                match retry_with_backoff(retry, &operation, || replies.fetch_replies(post)).await {
                    Ok(items) => items,
                    Err(e) => {
                        warn!(item = %post.id, error = %e, "reply fetch failed, scoring post without replies");
                        Vec::new()
                    }
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await
    }

    async fn score_items(
        &self,
        index: &IdIndex,
        to_score: &[(i64, String)],
        run_id: &str,
        concurrency: usize,
    ) -> Vec<PostRecord> {
        let scorer = self.scorer.as_ref();
        let scored: Vec<Option<PostRecord>> = stream::iter(to_score.iter().filter_map(|(day, id)| index.get(id).map(|item| (*day, item))))
            .map(|(day, item)| async move {
                let context = index.ancestors(item);
                match scorer.score(item, &context).await {
                    Ok(score) if SCORE_RANGE.contains(&score) => Some(PostRecord::new(
                        item.id.clone(),
                        day,
                        item.created_at,
                        item.parent_id.clone(),
                        score,
                        run_id,
                    )),
                    Ok(score) => {
                        warn!(item = %item.id, score, "score outside 0..=100, skipping item");
                        None
                    }
                    Err(e) => {
                        warn!(item = %item.id, error = %e, "scoring failed, skipping item");
                        None
                    }
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;
        scored.into_iter().flatten().collect()
    }

    /// Store errors are logged and otherwise ignored.
    async fn persist(
        &self,
        key: &SourceKey,
        day_length: i64,
        records: &[PostRecord],
        days: &[(i64, DaySentiment)],
        concurrency: usize,
    ) {
        let posts = self.post_store.as_ref();
        stream::iter(records)
            .for_each_concurrent(concurrency, |record| async move {
                if let Err(e) = posts.put(key, record).await {
                    warn!(item = %record.item_id, error = %e, "failed to store item score");
                }
            })
            .await;

        let cache = self.cache_store.as_ref();
        stream::iter(days)
            .for_each_concurrent(concurrency, |(day, value)| async move {
                if let Err(e) = cache.put(key, day_length, *day, *value).await {
                    warn!(day = %format_timestamp(*day), error = %e, "failed to store day sentiment");
                }
            })
            .await;
    }
}

fn dump_threads(index: &IdIndex, to_score: &[(i64, String)]) {
    for (day, id) in to_score {
        let Some(item) = index.get(id) else { continue };
        let chain: Vec<&str> = index.ancestors(item).iter().map(|a| a.id.as_str()).collect();
        debug!(
            day = %format_timestamp(*day),
            item = %item.id,
            at = %format_timestamp(item.created_at),
            context = ?chain,
            text = %item.text,
            "queued for scoring"
        );
    }
}
