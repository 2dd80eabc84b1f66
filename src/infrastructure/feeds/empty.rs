use crate::domain::entities::item::Item;
use crate::domain::ports::feed_adapter::{Cursor, FeedAdapter, FeedError, Page, ReplyFetcher};

/// Feed with no content. Stands in for a platform whose credentials are missing.
pub struct EmptyFeed {
    name: String,
}

impl EmptyFeed {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            name: format!("{} (no credentials)", platform.into()),
        }
    }
}

#[async_trait::async_trait]
impl FeedAdapter for EmptyFeed {
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_page(&self, _cursor: Option<&Cursor>) -> Result<Page, FeedError> {
        Ok(Page::empty())
    }
}

#[async_trait::async_trait]
impl ReplyFetcher for EmptyFeed {
    async fn fetch_replies(&self, _item: &Item) -> Result<Vec<Item>, FeedError> {
        Ok(Vec::new())
    }
}
