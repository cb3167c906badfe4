use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::core::types::{current_time_millis, UserId};
use crate::error::{AppError, AppResult};
use crate::storage::edge_store::{EdgeCursor, EdgePage, FollowEdge, FollowEdgeStore};

/// SQLite implementation of the follow edge store.
pub struct SqliteEdgeStore {
    pool: SqlitePool,
}

impl SqliteEdgeStore {
    pub async fn connect(url: &str) -> AppResult<Self> {
        let pool = SqlitePool::connect(url).await.map_err(|e| {
            AppError::StorageUnavailable(format!("Failed to connect to {}: {}", url, e))
        })?;
        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    pub async fn new_in_memory() -> AppResult<Self> {
        // A pooled :memory: database is per-connection; cap the pool at one
        // connection so every query sees the same database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| {
                AppError::StorageUnavailable(format!(
                    "Failed to connect to in-memory SQLite: {}",
                    e
                ))
            })?;
        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Create the edge table and its indexes. The composite primary key
    /// enforces at most one edge per ordered (follower, followee) pair;
    /// the secondary indexes serve count/list by either column.
    pub async fn initialize(&self) -> AppResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS follow_edges (
                follower_id INTEGER NOT NULL,
                followee_id INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                PRIMARY KEY (follower_id, followee_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::StorageUnavailable(format!("Failed to create follow_edges table: {}", e))
        })?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_follow_edges_followee \
             ON follow_edges(followee_id, created_at DESC, follower_id DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::StorageUnavailable(format!("Failed to create followee index: {}", e))
        })?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_follow_edges_follower \
             ON follow_edges(follower_id, created_at DESC, followee_id DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::StorageUnavailable(format!("Failed to create follower index: {}", e))
        })?;

        Ok(())
    }

    /// Shared keyset listing over either edge column. `key_column` is the
    /// column being matched, `peer_column` the one returned.
    async fn list_page(
        &self,
        key_column: &str,
        peer_column: &str,
        user_id: UserId,
        cursor: Option<EdgeCursor>,
        limit: u32,
    ) -> AppResult<EdgePage> {
        let mut sql = format!(
            "SELECT follower_id, followee_id, created_at FROM follow_edges WHERE {} = ?",
            key_column
        );
        if cursor.is_some() {
            sql.push_str(&format!(
                " AND (created_at < ? OR (created_at = ? AND {} < ?))",
                peer_column
            ));
        }
        sql.push_str(&format!(
            " ORDER BY created_at DESC, {} DESC LIMIT ?",
            peer_column
        ));

        let mut query = sqlx::query(&sql).bind(user_id);
        if let Some(c) = cursor {
            query = query.bind(c.created_at).bind(c.created_at).bind(c.user_id);
        }
        // Fetch one extra row to learn whether a next page exists.
        let rows = query
            .bind(limit as i64 + 1)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::StorageUnavailable(format!("Failed to list follow edges: {}", e))
            })?;

        let has_next = rows.len() as u64 > limit as u64;
        let mut edges: Vec<FollowEdge> = rows
            .into_iter()
            .map(|row| FollowEdge {
                follower_id: row.get("follower_id"),
                followee_id: row.get("followee_id"),
                created_at: row.get("created_at"),
            })
            .collect();
        edges.truncate(limit as usize);

        let next_cursor = if has_next {
            edges.last().map(|edge| EdgeCursor {
                created_at: edge.created_at,
                user_id: if peer_column == "follower_id" {
                    edge.follower_id
                } else {
                    edge.followee_id
                },
            })
        } else {
            None
        };

        Ok(EdgePage { edges, next_cursor })
    }

    async fn count_by(&self, column: &str, user_id: UserId) -> AppResult<u64> {
        let sql = format!("SELECT COUNT(*) AS n FROM follow_edges WHERE {} = ?", column);
        let row = sqlx::query(&sql)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::StorageUnavailable(format!("Failed to count follow edges: {}", e))
            })?;
        Ok(row.get::<i64, _>("n") as u64)
    }
}

#[async_trait]
impl FollowEdgeStore for SqliteEdgeStore {
    async fn exists(&self, follower_id: UserId, followee_id: UserId) -> AppResult<bool> {
        let row = sqlx::query(
            "SELECT 1 FROM follow_edges WHERE follower_id = ? AND followee_id = ?",
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::StorageUnavailable(format!("Failed to check edge existence: {}", e))
        })?;
        Ok(row.is_some())
    }

    async fn insert(&self, follower_id: UserId, followee_id: UserId) -> AppResult<FollowEdge> {
        if follower_id == followee_id {
            return Err(AppError::SelfFollow(follower_id));
        }

        let now = current_time_millis();
        let result = sqlx::query(
            "INSERT INTO follow_edges (follower_id, followee_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(follower_id)
        .bind(followee_id)
        .bind(now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(FollowEdge {
                follower_id,
                followee_id,
                created_at: now,
            }),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AppError::EdgeAlreadyExists {
                    follower: follower_id,
                    followee: followee_id,
                })
            }
            Err(e) => Err(AppError::StorageUnavailable(format!(
                "Failed to insert follow edge: {}",
                e
            ))),
        }
    }

    async fn remove(&self, follower_id: UserId, followee_id: UserId) -> AppResult<()> {
        let result = sqlx::query(
            "DELETE FROM follow_edges WHERE follower_id = ? AND followee_id = ?",
        )
        .bind(follower_id)
        .bind(followee_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::StorageUnavailable(format!("Failed to delete follow edge: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::EdgeNotFound {
                follower: follower_id,
                followee: followee_id,
            });
        }
        Ok(())
    }

    async fn list_followers(
        &self,
        user_id: UserId,
        cursor: Option<EdgeCursor>,
        limit: u32,
    ) -> AppResult<EdgePage> {
        self.list_page("followee_id", "follower_id", user_id, cursor, limit)
            .await
    }

    async fn list_following(
        &self,
        user_id: UserId,
        cursor: Option<EdgeCursor>,
        limit: u32,
    ) -> AppResult<EdgePage> {
        self.list_page("follower_id", "followee_id", user_id, cursor, limit)
            .await
    }

    async fn count_followers(&self, user_id: UserId) -> AppResult<u64> {
        self.count_by("followee_id", user_id).await
    }

    async fn count_following(&self, user_id: UserId) -> AppResult<u64> {
        self.count_by("follower_id", user_id).await
    }
}
