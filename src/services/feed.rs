// Following feed - fan-out-on-read over the current edge set. Every call
// resolves the viewer's followees, scatters to the content store, then
// merges and paginates. Nothing is cached between calls, so the feed always
// reflects edges committed before the read started.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::FeedConfig;
use crate::content::{ContentStatus, ContentStore, ContentSummary};
use crate::core::types::UserId;
use crate::error::AppResult;
use crate::storage::edge_store::FollowEdgeStore;

/// One feed item: a content summary plus its authoring user.
#[derive(Debug, Clone, Serialize)]
pub struct FeedEntry {
    pub author_id: UserId,
    pub content: ContentSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedPage {
    pub entries: Vec<FeedEntry>,
    pub has_more: bool,
    /// Followees whose content could not be fetched. Non-fatal; exposed so
    /// monitoring can spot a degraded content store.
    pub fetch_failures: u32,
    /// The request was cancelled mid-fan-out; entries hold whatever had
    /// been gathered by then.
    pub cancelled: bool,
}

impl FeedPage {
    fn empty() -> Self {
        Self {
            entries: Vec::new(),
            has_more: false,
            fetch_failures: 0,
            cancelled: false,
        }
    }
}

pub struct FollowingFeedService {
    edges: Arc<dyn FollowEdgeStore>,
    content: Arc<dyn ContentStore>,
    config: FeedConfig,
}

impl FollowingFeedService {
    pub fn new(
        edges: Arc<dyn FollowEdgeStore>,
        content: Arc<dyn ContentStore>,
        config: FeedConfig,
    ) -> Self {
        Self {
            edges,
            content,
            config,
        }
    }

    /// Assemble the viewer's feed page (1-based). A failure fetching one
    /// followee's content is skipped and counted, never fatal; only edge
    /// store failures propagate.
    pub async fn get_feed(
        &self,
        viewer_id: UserId,
        page: u32,
        page_size: u32,
        cancel: &CancellationToken,
    ) -> AppResult<FeedPage> {
        let followees = self.resolve_followees(viewer_id).await?;
        if followees.is_empty() {
            return Ok(FeedPage::empty());
        }

        let mut fetches: FuturesUnordered<_> = followees
            .iter()
            .map(|&author_id| self.fetch_author(author_id))
            .collect();

        let mut gathered: Vec<ContentSummary> = Vec::new();
        let mut fetch_failures = 0u32;
        let mut cancelled = false;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                next = fetches.next() => match next {
                    Some((_, Ok(items))) => gathered.extend(items),
                    Some((author_id, Err(e))) => {
                        warn!(viewer_id, author_id, error = %e, "feed fan-out fetch failed");
                        fetch_failures += 1;
                    }
                    None => break,
                },
            }
        }
        drop(fetches);

        // Recency order, newest first; content id breaks timestamp ties so
        // pagination stays deterministic.
        gathered.sort_by(|a, b| {
            b.ordering_time()
                .cmp(&a.ordering_time())
                .then(b.id.cmp(&a.id))
        });

        let page = page.max(1);
        let start = ((page - 1) as usize).saturating_mul(page_size as usize);
        let end = start.saturating_add(page_size as usize);
        let has_more = gathered.len() > end;
        let entries = gathered
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .map(|content| FeedEntry {
                author_id: content.author_id,
                content,
            })
            .collect();

        Ok(FeedPage {
            entries,
            has_more,
            fetch_failures,
            cancelled,
        })
    }

    /// Followee ids, most recently followed first, capped at the configured
    /// fan-out maximum. Exceeding the cap degrades to the most recent N
    /// rather than erroring.
    async fn resolve_followees(&self, viewer_id: UserId) -> AppResult<Vec<UserId>> {
        let mut followees = Vec::new();
        let mut cursor = None;
        while (followees.len() as u32) < self.config.max_fanout {
            let remaining = self.config.max_fanout - followees.len() as u32;
            let page = self
                .edges
                .list_following(viewer_id, cursor, remaining)
                .await?;
            followees.extend(page.edges.iter().map(|e| e.followee_id));
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(followees)
    }

    /// Published content for one author, following the store's cursor chain
    /// up to the configured page cap.
    async fn fetch_author(&self, author_id: UserId) -> (UserId, AppResult<Vec<ContentSummary>>) {
        let mut items = Vec::new();
        let mut cursor = None;
        for _ in 0..self.config.max_author_pages {
            match self
                .content
                .list_by_author(author_id, ContentStatus::Published, cursor)
                .await
            {
                Ok(page) => {
                    items.extend(page.items);
                    match page.next_cursor {
                        Some(next) => cursor = Some(next),
                        None => return (author_id, Ok(items)),
                    }
                }
                Err(e) => return (author_id, Err(e)),
            }
        }
        (author_id, Ok(items))
    }
}
