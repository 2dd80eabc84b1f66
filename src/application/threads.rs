use crate::domain::entities::item::Item;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Items of one run keyed by fullname, used to rebuild reply chains.
#[derive(Debug, Default)]
pub struct IdIndex {
    items: HashMap<String, Item>,
}

impl IdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `item`. An item already indexed under the same id is kept and
    /// `false` is returned.
    pub fn insert(&mut self, item: Item) -> bool {
        if self.items.contains_key(&item.id) {
            return false;
        }
        self.items.insert(item.id.clone(), item);
        true
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = Item>) {
        for item in items {
            self.insert(item);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Parent chain of `item`, nearest first.
    ///
    /// The walk stops at the first parent that was never fetched. A cycle in
    /// parent links stops the walk at the repeated item.
    pub fn ancestors(&self, item: &Item) -> Vec<&Item> {
        let mut chain = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(item.id.as_str());

        let mut next = item.parent_id.as_deref();
        while let Some(parent_id) = next {
            let Some(parent) = self.items.get(parent_id) else {
                break;
            };
            if !seen.insert(parent.id.as_str()) {
                warn!(item = %item.id, repeated = %parent.id, "cycle in reply chain");
                break;
            }
            chain.push(parent);
            next = parent.parent_id.as_deref();
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids<'a>(chain: &[&'a Item]) -> Vec<&'a str> {
        chain.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let mut index = IdIndex::new();
        index.extend(vec![
            Item::post("t3_p", 0, "post"),
            Item::comment("t1_a", 1, "t3_p", "a"),
            Item::comment("t1_b", 2, "t1_a", "b"),
        ]);
        let leaf = Item::comment("t1_c", 3, "t1_b", "c");
        assert_eq!(ids(&index.ancestors(&leaf)), vec!["t1_b", "t1_a", "t3_p"]);
    }

    #[test]
    fn test_missing_parent_truncates_chain() {
        let mut index = IdIndex::new();
        index.insert(Item::comment("t1_a", 1, "t3_gone", "a"));
        let leaf = Item::comment("t1_b", 2, "t1_a", "b");
        assert_eq!(ids(&index.ancestors(&leaf)), vec!["t1_a"]);
        assert!(index.ancestors(&Item::post("t3_x", 0, "")).is_empty());
    }

    #[test]
    fn test_cycle_terminates() {
        let mut index = IdIndex::new();
        index.insert(Item::comment("a", 1, "b", ""));
        index.insert(Item::comment("b", 2, "a", ""));
        let chain = index.ancestors(index.get("a").unwrap());
        assert_eq!(ids(&chain), vec!["b"]);
    }

    #[test]
    fn test_duplicate_insert_keeps_first() {
        let mut index = IdIndex::new();
        assert!(index.insert(Item::post("x", 1, "first")));
        assert!(!index.insert(Item::post("x", 2, "second")));
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("x").unwrap().text, "first");
    }
}
