use std::fmt;

use crate::core::types::UserId;

#[derive(Debug)]
pub enum AppError {
    /// A user attempted to follow themselves. User-visible, non-retryable.
    SelfFollow(UserId),
    /// The follow edge is already present. Absorbed by FollowGraphService.
    EdgeAlreadyExists { follower: UserId, followee: UserId },
    /// The follow edge does not exist. Absorbed by FollowGraphService.
    EdgeNotFound { follower: UserId, followee: UserId },
    /// Transient storage failure. Callers retry with backoff.
    StorageUnavailable(String),
    /// A pagination cursor that did not come from this service.
    InvalidCursor(String),
    /// The caller's cancellation signal fired before the operation
    /// committed.
    Cancelled,
    Configuration(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::SelfFollow(user) => {
                write!(f, "Self-follow rejected: user {} cannot follow themselves", user)
            }
            AppError::EdgeAlreadyExists { follower, followee } => {
                write!(f, "Follow edge already exists: {} -> {}", follower, followee)
            }
            AppError::EdgeNotFound { follower, followee } => {
                write!(f, "Follow edge not found: {} -> {}", follower, followee)
            }
            AppError::StorageUnavailable(msg) => write!(f, "Storage unavailable: {}", msg),
            AppError::InvalidCursor(token) => write!(f, "Invalid cursor: {}", token),
            AppError::Cancelled => write!(f, "Operation cancelled"),
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::StorageUnavailable(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
