pub mod edge_store;
pub mod sqlite;

pub use edge_store::{EdgeCursor, EdgePage, FollowEdge, FollowEdgeStore};
pub use sqlite::SqliteEdgeStore;
