pub mod types;

pub use types::{current_time_millis, ContentId, Timestamp, UserId};
