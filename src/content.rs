// External collaborators - interfaces consumed by the core, implemented
// by the surrounding application (content CRUD and auth live outside this
// crate).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::types::{ContentId, Timestamp, UserId};
use crate::error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Published,
    Draft,
}

/// Summary of one content item as returned by the external content store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSummary {
    pub id: ContentId,
    pub title: String,
    pub body_excerpt: String,
    pub author_id: UserId,
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub view_count: u64,
    pub category: Option<String>,
}

impl ContentSummary {
    /// Feed ordering key: publish time, falling back to creation time for
    /// rows that predate the published_at column.
    pub fn ordering_time(&self) -> Timestamp {
        self.published_at.unwrap_or(self.created_at)
    }
}

/// One page of an author's content, with an opaque continuation cursor.
#[derive(Debug, Clone)]
pub struct ContentPage {
    pub items: Vec<ContentSummary>,
    pub next_cursor: Option<String>,
}

/// Content lookup by author, provided by the content subsystem.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn list_by_author(
        &self,
        author_id: UserId,
        status: ContentStatus,
        cursor: Option<String>,
    ) -> AppResult<ContentPage>;
}

/// Resolves the caller's identity. Used by the API layer to supply
/// viewer_id; the core itself never reads ambient session state.
pub trait AuthContext: Send + Sync {
    fn current_user_id(&self) -> Option<UserId>;
}
