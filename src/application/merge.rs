use crate::domain::values::day_sentiment::DaySentiment;
use crate::domain::values::time_window::TimeWindow;
use std::collections::BTreeMap;

/// Day slots of one window, filled either from the cache or by fresh scoring.
///
/// Every window day has a slot. A slot is `Some` once a value is known.
#[derive(Debug, Clone)]
pub struct SentimentCache {
    slots: BTreeMap<i64, Option<f64>>,
    cached: Vec<i64>,
}

impl SentimentCache {
    pub fn empty(window: &TimeWindow) -> Self {
        Self {
            slots: window.days().map(|day| (day, None)).collect(),
            cached: Vec::new(),
        }
    }

    /// Seeds slots with cache hits. Entries for days outside the window and
    /// non-finite values are ignored.
    pub fn from_entries(window: &TimeWindow, entries: impl IntoIterator<Item = (i64, Option<f64>)>) -> Self {
        let mut cache = Self::empty(window);
        for (day, value) in entries {
            let Some(value) = value.filter(|v| v.is_finite()) else {
                continue;
            };
            if let Some(slot) = cache.slots.get_mut(&day) {
                *slot = Some(value);
                cache.cached.push(day);
            }
        }
        cache.cached.sort_unstable();
        cache
    }

    pub fn cached(&self, day: i64) -> Option<f64> {
        if self.is_cached(day) {
            self.slots.get(&day).copied().flatten()
        } else {
            None
        }
    }

    /// True when the day's value came from the cache.
    pub fn is_cached(&self, day: i64) -> bool {
        self.cached.binary_search(&day).is_ok()
    }

    pub fn cached_days(&self) -> &[i64] {
        &self.cached
    }

    /// Days that must be computed this run, oldest first.
    pub fn uncached_days(&self) -> Vec<i64> {
        self.slots.keys().copied().filter(|day| !self.is_cached(*day)).collect()
    }

    /// Records a freshly computed value. Cached days are never overwritten.
    pub fn fill(&mut self, day: i64, value: DaySentiment) {
        if self.is_cached(day) {
            return;
        }
        if let Some(slot) = self.slots.get_mut(&day) {
            *slot = value.score();
        }
    }

    /// One entry per window day; days without a value become `NoData`.
    pub fn into_days(self) -> BTreeMap<i64, DaySentiment> {
        self.slots
            .into_iter()
            .map(|(day, value)| (day, DaySentiment::from(value)))
            .collect()
    }
}
