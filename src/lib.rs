// Follow graph core - social graph storage, derived stats, and the
// following feed. The surrounding application supplies content lookup and
// auth (see content.rs) and owns the HTTP surface.

// Core types and primitives
pub mod core;

// External collaborator interfaces
pub mod content;

// Edge storage - the single writer of truth for follow relationships
pub mod storage;

// Graph mutation, stats, and feed services
pub mod services;

// Common utilities
pub mod config;
pub mod error;

// Re-exports for convenience
pub use config::Config;
pub use error::{AppError, AppResult};
