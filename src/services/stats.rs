// Follow statistics - a read-time projection over the edge store. Counts
// are recomputed on every request rather than maintained incrementally, so
// a stat can never drift from the edge set it summarizes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::core::types::UserId;
use crate::error::AppResult;
use crate::services::cancellable;
use crate::storage::edge_store::FollowEdgeStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowStats {
    pub followers_count: u64,
    pub following_count: u64,
    /// Viewer follows the subject.
    pub is_following: bool,
    /// Subject follows the viewer.
    pub is_followed_by: bool,
}

pub struct FollowStatsService {
    edges: Arc<dyn FollowEdgeStore>,
}

impl FollowStatsService {
    pub fn new(edges: Arc<dyn FollowEdgeStore>) -> Self {
        Self { edges }
    }

    /// Stats for subject_id as seen by viewer_id. Without a viewer the
    /// relationship booleans are false.
    pub async fn get_stats(
        &self,
        subject_id: UserId,
        viewer_id: Option<UserId>,
        cancel: &CancellationToken,
    ) -> AppResult<FollowStats> {
        cancellable(cancel, async {
            let followers_count = self.edges.count_followers(subject_id).await?;
            let following_count = self.edges.count_following(subject_id).await?;

            let (is_following, is_followed_by) = match viewer_id {
                Some(viewer) => (
                    self.edges.exists(viewer, subject_id).await?,
                    self.edges.exists(subject_id, viewer).await?,
                ),
                None => (false, false),
            };

            Ok(FollowStats {
                followers_count,
                following_count,
                is_following,
                is_followed_by,
            })
        })
        .await
    }
}
