//! Error types for the Shelf engine.

use crate::BookId;
use thiserror::Error;

/// Errors from the engine.
///
/// Stale versions and transient failures are not errors; they are reported
/// as [`crate::SaveOutcome`] values. These variants cover malformed input and
/// misuse of the client-side reconciliation state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Input errors
    #[error("invalid book: {0}")]
    InvalidBook(String),

    // Client state errors
    #[error("book not found: {0}")]
    BookNotFound(BookId),

    #[error("nothing to undo for book: {0}")]
    NothingToUndo(BookId),

    #[error("undo window expired for book: {0}")]
    UndoExpired(BookId),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
