// Follow graph mutations and listings. Each (follower, followee) pair moves
// between exactly two states, NotFollowing and Following; both transitions
// are total because duplicate follows and missing unfollows are normalized
// to success here rather than surfaced to callers.

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::GraphConfig;
use crate::core::types::UserId;
use crate::error::{AppError, AppResult};
use crate::services::cancellable;
use crate::storage::edge_store::{EdgeCursor, FollowEdgeStore};

/// One page of follower/following ids. Page 1 is cursor = None; later pages
/// pass back next_cursor.
#[derive(Debug, Clone, Serialize)]
pub struct FollowList {
    pub items: Vec<UserId>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

pub struct FollowGraphService {
    edges: Arc<dyn FollowEdgeStore>,
    page_size: u32,
}

impl FollowGraphService {
    pub fn new(edges: Arc<dyn FollowEdgeStore>, config: GraphConfig) -> Self {
        Self {
            edges,
            // A zero page size would terminate every cursor chain on an
            // empty page; listings need at least one row to make progress.
            page_size: config.page_size.max(1),
        }
    }

    /// Idempotent follow. Self-follow is the only surfaced error; a second
    /// follow of the same user is a silent success, matching the UI's
    /// optimistic toggle.
    pub async fn follow(
        &self,
        follower_id: UserId,
        followee_id: UserId,
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        if follower_id == followee_id {
            return Err(AppError::SelfFollow(follower_id));
        }

        let result = cancellable(cancel, self.edges.insert(follower_id, followee_id)).await;
        match result {
            Ok(edge) => {
                info!(follower_id, followee_id, created_at = edge.created_at, "follow");
                Ok(())
            }
            Err(AppError::EdgeAlreadyExists { .. }) => {
                debug!(follower_id, followee_id, "follow: edge already present");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Idempotent unfollow; always succeeds from the caller's perspective.
    pub async fn unfollow(
        &self,
        follower_id: UserId,
        followee_id: UserId,
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        let result = cancellable(cancel, self.edges.remove(follower_id, followee_id)).await;
        match result {
            Ok(()) => {
                info!(follower_id, followee_id, "unfollow");
                Ok(())
            }
            Err(AppError::EdgeNotFound { .. }) => {
                debug!(follower_id, followee_id, "unfollow: edge already absent");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn list_followers(
        &self,
        user_id: UserId,
        cursor: Option<String>,
        cancel: &CancellationToken,
    ) -> AppResult<FollowList> {
        let cursor = decode_cursor(cursor)?;
        let page = cancellable(
            cancel,
            self.edges.list_followers(user_id, cursor, self.page_size),
        )
        .await?;
        Ok(to_list(
            page.edges.iter().map(|e| e.follower_id).collect(),
            page.next_cursor,
        ))
    }

    pub async fn list_following(
        &self,
        user_id: UserId,
        cursor: Option<String>,
        cancel: &CancellationToken,
    ) -> AppResult<FollowList> {
        let cursor = decode_cursor(cursor)?;
        let page = cancellable(
            cancel,
            self.edges.list_following(user_id, cursor, self.page_size),
        )
        .await?;
        Ok(to_list(
            page.edges.iter().map(|e| e.followee_id).collect(),
            page.next_cursor,
        ))
    }
}

fn to_list(items: Vec<UserId>, next_cursor: Option<EdgeCursor>) -> FollowList {
    // The store fetches one row past the page, so next_cursor is an exact
    // has-more signal; a full final page does not claim more.
    FollowList {
        has_more: next_cursor.is_some(),
        next_cursor: next_cursor.map(|c| c.encode()),
        items,
    }
}

fn decode_cursor(cursor: Option<String>) -> AppResult<Option<EdgeCursor>> {
    cursor.map(|c| EdgeCursor::decode(&c)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sqlite::SqliteEdgeStore;

    async fn service(page_size: u32) -> (FollowGraphService, Arc<SqliteEdgeStore>) {
        let store = Arc::new(SqliteEdgeStore::new_in_memory().await.unwrap());
        (
            FollowGraphService::new(store.clone(), GraphConfig { page_size }),
            store,
        )
    }

    #[tokio::test]
    async fn follow_twice_equals_follow_once() {
        let (graph, store) = service(20).await;
        let cancel = CancellationToken::new();
        graph.follow(1, 2, &cancel).await.unwrap();
        graph.follow(1, 2, &cancel).await.unwrap();

        assert!(store.exists(1, 2).await.unwrap());
        assert_eq!(store.count_followers(2).await.unwrap(), 1);
        assert_eq!(store.count_following(1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn self_follow_is_the_only_follow_error() {
        let (graph, store) = service(20).await;
        let err = graph
            .follow(5, 5, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SelfFollow(5)));
        assert_eq!(store.count_following(5).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unfollow_is_a_noop_when_not_following() {
        let (graph, store) = service(20).await;
        let cancel = CancellationToken::new();
        graph.unfollow(1, 2, &cancel).await.unwrap();
        assert_eq!(store.count_followers(2).await.unwrap(), 0);

        graph.follow(1, 2, &cancel).await.unwrap();
        graph.unfollow(1, 2, &cancel).await.unwrap();
        graph.unfollow(1, 2, &cancel).await.unwrap();
        assert!(!store.exists(1, 2).await.unwrap());
    }

    #[tokio::test]
    async fn follower_listing_paginates_with_has_more() {
        let (graph, _store) = service(1).await;
        let cancel = CancellationToken::new();
        graph.follow(1, 2, &cancel).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        graph.follow(4, 2, &cancel).await.unwrap();

        let first = graph.list_followers(2, None, &cancel).await.unwrap();
        assert_eq!(first.items.len(), 1);
        assert!(first.has_more);

        let second = graph
            .list_followers(2, first.next_cursor.clone(), &cancel)
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert!(!second.has_more);
        assert_ne!(first.items[0], second.items[0]);
    }

    #[tokio::test]
    async fn following_listing_returns_followees() {
        let (graph, _store) = service(20).await;
        let cancel = CancellationToken::new();
        graph.follow(1, 2, &cancel).await.unwrap();
        graph.follow(1, 3, &cancel).await.unwrap();

        let list = graph.list_following(1, None, &cancel).await.unwrap();
        let mut items = list.items.clone();
        items.sort();
        assert_eq!(items, vec![2, 3]);
        assert!(!list.has_more);
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits_operations() {
        let (graph, store) = service(20).await;
        let live = CancellationToken::new();
        graph.follow(1, 2, &live).await.unwrap();

        let cancelled = CancellationToken::new();
        cancelled.cancel();

        let err = graph.list_followers(2, None, &cancelled).await.unwrap_err();
        assert!(matches!(err, AppError::Cancelled));

        let err = graph.follow(3, 2, &cancelled).await.unwrap_err();
        assert!(matches!(err, AppError::Cancelled));
        // The aborted follow left no edge behind.
        assert_eq!(store.count_followers(2).await.unwrap(), 1);

        let err = graph.unfollow(1, 2, &cancelled).await.unwrap_err();
        assert!(matches!(err, AppError::Cancelled));
        assert!(store.exists(1, 2).await.unwrap());
    }

    #[tokio::test]
    async fn zero_page_size_is_clamped_to_one() {
        let (graph, _store) = service(0).await;
        let cancel = CancellationToken::new();
        graph.follow(1, 2, &cancel).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        graph.follow(4, 2, &cancel).await.unwrap();

        let first = graph.list_followers(2, None, &cancel).await.unwrap();
        assert_eq!(first.items.len(), 1);
        assert!(first.has_more);

        let second = graph
            .list_followers(2, first.next_cursor.clone(), &cancel)
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert!(!second.has_more);
    }
}
