//! The three-way result of a save attempt.

use crate::{Book, Version};
use serde::{Deserialize, Serialize};

/// Result of submitting a book to the store.
///
/// Exactly one of the variants is produced per attempt. `Failure` and
/// `Conflict` guarantee that the store was left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum SaveOutcome {
    /// The store accepted the save
    #[serde(rename_all = "camelCase")]
    Success { book: Book, new_version: Version },
    /// Transient error; nothing was applied and the save may be retried
    Failure { error: String },
    /// The submitted version was stale; carries the store's current copy
    #[serde(rename_all = "camelCase")]
    Conflict { server_book: Book },
}

impl SaveOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SaveOutcome::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, SaveOutcome::Failure { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, SaveOutcome::Conflict { .. })
    }

    /// The version the store holds after this outcome, if it reveals one.
    pub fn server_version(&self) -> Option<Version> {
        match self {
            SaveOutcome::Success { new_version, .. } => Some(*new_version),
            SaveOutcome::Conflict { server_book } => Some(server_book.version),
            SaveOutcome::Failure { .. } => None,
        }
    }
}
