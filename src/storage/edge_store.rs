// Follow edge storage - the single writer of truth for the social graph.
// Uniqueness comes from the storage layer's composite primary key, never
// from application-level locking.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::types::{Timestamp, UserId};
use crate::error::{AppError, AppResult};

/// A directed follow relationship: follower follows followee. Value type,
/// holds user ids only. Deleted outright on unfollow; re-following creates
/// a new edge with a new created_at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowEdge {
    pub follower_id: UserId,
    pub followee_id: UserId,
    pub created_at: Timestamp,
}

/// Keyset cursor over (created_at, peer_id), descending. Keeps listings
/// stable when edges are inserted concurrently: offset pagination would
/// skip or duplicate rows as new edges land at the front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeCursor {
    pub created_at: Timestamp,
    pub user_id: UserId,
}

impl EdgeCursor {
    /// Opaque string form handed to API callers, "created_at:user_id".
    pub fn encode(&self) -> String {
        format!("{}:{}", self.created_at, self.user_id)
    }

    pub fn decode(token: &str) -> AppResult<Self> {
        let (time, id) = token
            .split_once(':')
            .ok_or_else(|| AppError::InvalidCursor(token.to_string()))?;
        let created_at = time
            .parse()
            .map_err(|_| AppError::InvalidCursor(token.to_string()))?;
        let user_id = id
            .parse()
            .map_err(|_| AppError::InvalidCursor(token.to_string()))?;
        Ok(Self { created_at, user_id })
    }
}

/// One page of edges plus the cursor to continue from.
#[derive(Debug, Clone)]
pub struct EdgePage {
    pub edges: Vec<FollowEdge>,
    pub next_cursor: Option<EdgeCursor>,
}

/// Durable store of follow edges. All mutations are committed before
/// returning.
#[async_trait]
pub trait FollowEdgeStore: Send + Sync {
    async fn exists(&self, follower_id: UserId, followee_id: UserId) -> AppResult<bool>;

    /// Inserts the edge. Fails with SelfFollow when follower == followee
    /// and EdgeAlreadyExists on duplicate insert (callers treat the latter
    /// as success for idempotence).
    async fn insert(&self, follower_id: UserId, followee_id: UserId) -> AppResult<FollowEdge>;

    /// Deletes the edge. Fails with EdgeNotFound when absent; callers treat
    /// that as a no-op success.
    async fn remove(&self, follower_id: UserId, followee_id: UserId) -> AppResult<()>;

    /// Followers of user_id, newest follow first.
    async fn list_followers(
        &self,
        user_id: UserId,
        cursor: Option<EdgeCursor>,
        limit: u32,
    ) -> AppResult<EdgePage>;

    /// Users followed by user_id, newest follow first.
    async fn list_following(
        &self,
        user_id: UserId,
        cursor: Option<EdgeCursor>,
        limit: u32,
    ) -> AppResult<EdgePage>;

    async fn count_followers(&self, user_id: UserId) -> AppResult<u64>;
    async fn count_following(&self, user_id: UserId) -> AppResult<u64>;
}
