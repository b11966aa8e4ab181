//! Error handling for the sync layer.
//!
//! Stale versions and simulated network failures are ordinary
//! [`shelf_engine::SaveOutcome`] values. `SyncError` is reserved for the
//! unexpected path.

use shelf_engine::BookId;

/// Sync layer error type.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Engine error: {0}")]
    Engine(#[from] shelf_engine::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Seed data error: {0}")]
    Seed(#[from] serde_json::Error),

    #[error("Save queue closed for book: {0}")]
    QueueClosed(BookId),
}

/// Result type alias for the sync layer.
pub type Result<T> = std::result::Result<T, SyncError>;
