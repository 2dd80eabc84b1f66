use crate::domain::entities::item::Item;
use crate::domain::values::time_window::TimeWindow;
use std::collections::BTreeMap;

/// Items grouped by the window day they were created in.
///
/// Keys are always day starts inside the window; items keep their insertion order.
#[derive(Debug, Clone)]
pub struct DayBuckets {
    window: TimeWindow,
    days: BTreeMap<i64, Vec<Item>>,
}

impl DayBuckets {
    pub fn new(window: TimeWindow) -> Self {
        Self {
            window,
            days: BTreeMap::new(),
        }
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    /// Appends `item` to its day. Items outside the window are dropped and
    /// `false` is returned.
    pub fn insert(&mut self, item: Item) -> bool {
        match self.window.bucket(item.created_at) {
            Some(day) => {
                self.days.entry(day).or_default().push(item);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, day: i64) -> &[Item] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Non-empty days, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &[Item])> {
        self.days.iter().map(|(day, items)| (*day, items.as_slice()))
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.days.values().flatten()
    }

    pub fn total_items(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn into_days(self) -> BTreeMap<i64, Vec<Item>> {
        self.days
    }
}
