use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Top-level content: a submission, a tweet matching the query, a video
    Post,
    /// A reply to a post or to another comment
    Comment,
}

/// One piece of fetched content, either a post or a reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Platform-unique fullname (e.g. `t3_abc`, `yt_comment_xyz`).
    pub id: String,
    pub kind: ItemKind,
    /// Unix seconds.
    pub created_at: i64,
    /// Fullname of the item this one replies to.
    pub parent_id: Option<String>,
    pub text: String,
    /// Reply count reported by the platform, when it reports one.
    pub reply_count: Option<u64>,
    /// Platform payload forwarded to scoring and storage as-is.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Item {
    pub fn post(id: impl Into<String>, created_at: i64, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ItemKind::Post,
            created_at,
            parent_id: None,
            text: text.into(),
            reply_count: None,
            metadata: serde_json::Value::Null,
        }
    }

    pub fn comment(
        id: impl Into<String>,
        created_at: i64,
        parent_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: ItemKind::Comment,
            created_at,
            parent_id: Some(parent_id.into()),
            text: text.into(),
            reply_count: None,
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_reply_count(mut self, count: u64) -> Self {
        self.reply_count = Some(count);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// False only when the platform told us there are no replies.
    pub fn may_have_replies(&self) -> bool {
        self.reply_count != Some(0)
    }
}
