// Core primitives shared by the graph and feed layers.

/// User ID type, owned by the external user directory.
pub type UserId = i64;

/// Content item ID type, owned by the external content store.
pub type ContentId = i64;

/// Millisecond Unix timestamp.
pub type Timestamp = i64;

/// Current time in milliseconds since Unix epoch
pub fn current_time_millis() -> Timestamp {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}
