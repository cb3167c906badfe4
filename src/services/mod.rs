pub mod feed;
pub mod graph;
pub mod stats;

pub use feed::{FeedEntry, FeedPage, FollowingFeedService};
pub use graph::{FollowGraphService, FollowList};
pub use stats::{FollowStats, FollowStatsService};

use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};

/// Race an operation against the caller's cancellation signal. A token that
/// is already cancelled wins before the operation is polled, so aborted
/// mutations leave no trace.
pub(crate) async fn cancellable<T>(
    cancel: &CancellationToken,
    op: impl std::future::Future<Output = AppResult<T>>,
) -> AppResult<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AppError::Cancelled),
        result = op => result,
    }
}
