//! Window walk over a reverse-chronological feed.
//!
//! Pages arrive newest first. Pages that are entirely newer than the window are
//! skipped without looking at their items; the first item older than the window
//! ends the walk, since everything after it is older still.

use super::buckets::DayBuckets;
use super::retry::{retry_with_backoff, RetryPolicy};
use crate::domain::ports::feed_adapter::{Cursor, FeedAdapter};
use crate::domain::values::time_window::TimeWindow;
use serde::Serialize;
use tracing::{debug, warn};

/// Bounds on a single walk. `None` means unbounded.
#[derive(Debug, Clone, Default)]
pub struct PageLimits {
    pub max_pages: Option<usize>,
    pub max_items: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The feed returned an empty page or no further cursor.
    Exhausted,
    /// An item older than the window start was reached.
    ReachedWindowStart,
    /// A page request failed after retries; buckets hold what came before it.
    FetchFailed(String),
    /// `max_pages` or `max_items` was hit.
    LimitReached,
    /// The feed returned the cursor it was given.
    CursorStalled,
}

#[derive(Debug, Clone)]
pub struct WindowScan {
    pub buckets: DayBuckets,
    pub pages_fetched: usize,
    pub pages_skipped: usize,
    pub stop: StopReason,
}

/// Walk `feed` and bucket every item created inside `window`.
///
/// Never fails: a fetch error ends the walk and the partial buckets are returned
/// with [`StopReason::FetchFailed`].
pub async fn scan_window(
    feed: &dyn FeedAdapter,
    window: &TimeWindow,
    limits: &PageLimits,
    retry: &RetryPolicy,
) -> WindowScan {
    let mut buckets = DayBuckets::new(*window);
    let mut cursor: Option<Cursor> = None;
    let mut pages_fetched = 0usize;
    let mut pages_skipped = 0usize;
    let mut bucketed = 0usize;

    let stop = loop {
        if limits.max_pages.is_some_and(|max| pages_fetched >= max) {
            break StopReason::LimitReached;
        }

        let operation = format!("{} page {}", feed.name(), pages_fetched + 1);
        let page = match retry_with_backoff(retry, &operation, || feed.next_page(cursor.as_ref())).await {
            Ok(page) => page,
            Err(e) => {
                warn!(feed = feed.name(), error = %e, pages = pages_fetched, "page fetch failed, keeping partial results");
                break StopReason::FetchFailed(e.to_string());
            }
        };
        pages_fetched += 1;

        let Some(oldest) = page.items.last() else {
            debug!(feed = feed.name(), pages = pages_fetched, "empty page, feed exhausted");
            break StopReason::Exhausted;
        };

        if oldest.created_at >= window.end() {
            pages_skipped += 1;
            match advance(&mut cursor, page.next_cursor) {
                Some(stop) => break stop,
                None => continue,
            }
        }

        let mut reached_start = false;
        let mut hit_item_cap = false;
        for item in page.items {
            if item.created_at < window.start() {
                reached_start = true;
                break;
            }
            if item.created_at >= window.end() {
                continue;
            }
            if buckets.insert(item) {
                bucketed += 1;
            }
            if limits.max_items.is_some_and(|max| bucketed >= max) {
                hit_item_cap = true;
                break;
            }
        }

        if reached_start {
            debug!(feed = feed.name(), pages = pages_fetched, items = bucketed, "reached window start");
            break StopReason::ReachedWindowStart;
        }
        if hit_item_cap {
            break StopReason::LimitReached;
        }
        if let Some(stop) = advance(&mut cursor, page.next_cursor) {
            break stop;
        }
    };

    WindowScan {
        buckets,
        pages_fetched,
        pages_skipped,
        stop,
    }
}

/// Moves `cursor` forward, or says why the walk cannot continue.
fn advance(cursor: &mut Option<Cursor>, next: Option<Cursor>) -> Option<StopReason> {
    match next {
        None => Some(StopReason::Exhausted),
        Some(next) if cursor.as_ref() == Some(&next) => {
            warn!(cursor = next.as_str(), "feed returned the same cursor twice");
            Some(StopReason::CursorStalled)
        }
        Some(next) => {
            *cursor = Some(next);
            None
        }
    }
}
