//! Library - the client-side collection and its optimistic save bookkeeping.
//!
//! A save is applied locally before the store has seen it. The pre-edit
//! snapshot is kept in a per-book rollback slot until the outcome arrives,
//! and every outcome is turned into a [`Notice`] for the user.
//!
//! # Lifecycle of a save
//!
//! 1. [`Library::begin_save`] applies the edit and returns a [`PendingSave`]
//!    carrying the optimistic book and the version it was based on.
//! 2. The caller submits that book to the save queue.
//! 3. [`Library::resolve`] (or [`Library::resolve_error`]) reconciles the
//!    local copy with the outcome.
//! 4. [`Library::undo`] restores the pre-edit snapshot on request.

use crate::{error::Result, Book, BookEdit, BookId, Error, SaveOutcome, Timestamp, Version};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default time an undo offer stays visible (milliseconds).
pub const DEFAULT_UNDO_WINDOW_MS: u64 = 4000;

/// Identifies one optimistic save within a library.
pub type Ticket = u64;

/// An optimistic save waiting to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSave {
    pub ticket: Ticket,
    /// The optimistically edited book
    pub book: Book,
    /// The version the edit was based on
    pub base_version: Version,
}

/// Where a rollback slot stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RollbackState {
    /// Save still in flight; undo allowed until the deadline
    InFlight,
    /// Save failed; rollback offered without a deadline
    Failed,
    /// Save hit a conflict; rollback kept as a recovery action
    Conflicted,
}

#[derive(Debug, Clone)]
struct Rollback {
    ticket: Ticket,
    previous: Book,
    undo_deadline: Timestamp,
    state: RollbackState,
}

/// Which outcome a [`Notice::Superseded`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutcomeKind {
    Success,
    Failure,
    Conflict,
    /// Unexpected error raised by the save
    Error,
}

/// A transient, dismissible user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notice {
    /// Edit applied locally; undo offered until the deadline
    #[serde(rename_all = "camelCase")]
    Saved {
        book_id: BookId,
        undo_deadline: Timestamp,
    },
    /// The store accepted the save
    #[serde(rename_all = "camelCase")]
    Synced { book_id: BookId, version: Version },
    /// The store holds a newer version; resolution is up to the user
    #[serde(rename_all = "camelCase")]
    Conflict { book_id: BookId, server_book: Book },
    /// The save did not go through; rollback offered
    #[serde(rename_all = "camelCase")]
    SaveFailed {
        book_id: BookId,
        message: String,
        unexpected: bool,
    },
    /// An outcome arrived for an edit that has since been undone or edited
    /// again
    #[serde(rename_all = "camelCase")]
    Superseded {
        book_id: BookId,
        ticket: Ticket,
        outcome: OutcomeKind,
        /// A newer edit still holds a rollback for this book
        rollback_available: bool,
    },
}

impl Notice {
    pub fn book_id(&self) -> &BookId {
        match self {
            Notice::Saved { book_id, .. }
            | Notice::Synced { book_id, .. }
            | Notice::Conflict { book_id, .. }
            | Notice::SaveFailed { book_id, .. }
            | Notice::Superseded { book_id, .. } => book_id,
        }
    }

    /// Human readable message.
    pub fn message(&self) -> String {
        match self {
            Notice::Saved { .. } => "Saved (optimistic)".to_string(),
            Notice::Synced { .. } => "Saved".to_string(),
            Notice::Conflict { .. } => {
                "Conflict detected. Please choose resolution in UI.".to_string()
            }
            Notice::SaveFailed {
                unexpected: true, ..
            } => "Save failed (exception)".to_string(),
            Notice::SaveFailed { .. } => "Save failed".to_string(),
            Notice::Superseded { outcome, .. } => match outcome {
                OutcomeKind::Success => "Saved (superseded)".to_string(),
                OutcomeKind::Failure => "Save failed".to_string(),
                OutcomeKind::Conflict => {
                    "Conflict detected. Please choose resolution in UI.".to_string()
                }
                OutcomeKind::Error => "Save failed (exception)".to_string(),
            },
        }
    }

    /// Whether the notice comes with a rollback action.
    pub fn offers_rollback(&self) -> bool {
        match self {
            Notice::Saved { .. } | Notice::Conflict { .. } | Notice::SaveFailed { .. } => true,
            Notice::Superseded {
                outcome,
                rollback_available,
                ..
            } => *outcome != OutcomeKind::Success && *rollback_available,
            Notice::Synced { .. } => false,
        }
    }

    /// Whether the notice reports a save that did not go through.
    pub fn is_unsuccessful(&self) -> bool {
        match self {
            Notice::Conflict { .. } | Notice::SaveFailed { .. } => true,
            Notice::Superseded { outcome, .. } => *outcome != OutcomeKind::Success,
            Notice::Saved { .. } | Notice::Synced { .. } => false,
        }
    }
}

/// The local book collection.
#[derive(Debug, Clone)]
pub struct Library {
    books: Vec<Book>,
    rollbacks: HashMap<BookId, Rollback>,
    next_ticket: Ticket,
    undo_window: u64,
}

impl Default for Library {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_WINDOW_MS)
    }
}

impl Library {
    /// Create an empty library with the given undo window (milliseconds).
    pub fn new(undo_window: u64) -> Self {
        Self {
            books: Vec::new(),
            rollbacks: HashMap::new(),
            next_ticket: 1,
            undo_window,
        }
    }

    /// Replace the collection, dropping any rollback state.
    pub fn load(&mut self, books: Vec<Book>) {
        self.books = books;
        self.rollbacks.clear();
    }

    /// Books in load order.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Get a book by ID.
    pub fn get(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    /// Whether a rollback is currently held for `id`.
    pub fn rollback_state(&self, id: &str) -> Option<RollbackState> {
        self.rollbacks.get(id).map(|r| r.state)
    }

    /// Apply `edit` to `id` optimistically.
    ///
    /// The current copy becomes the rollback snapshot, replacing any older
    /// one for the same book.
    pub fn begin_save(&mut self, id: &str, edit: &BookEdit, now: Timestamp) -> Result<PendingSave> {
        let current = self
            .get(id)
            .cloned()
            .ok_or_else(|| Error::BookNotFound(id.to_string()))?;

        let updated = current.edited(edit, now);
        let ticket = self.next_ticket;
        self.next_ticket += 1;

        self.rollbacks.insert(
            current.id.clone(),
            Rollback {
                ticket,
                previous: current.clone(),
                undo_deadline: now.saturating_add(self.undo_window),
                state: RollbackState::InFlight,
            },
        );
        self.replace(updated.clone());

        Ok(PendingSave {
            ticket,
            base_version: current.version,
            book: updated,
        })
    }

    /// The notice shown right after [`Library::begin_save`].
    pub fn notice_for_begin(&self, pending: &PendingSave) -> Notice {
        let undo_deadline = self
            .rollbacks
            .get(&pending.book.id)
            .map(|r| r.undo_deadline)
            .unwrap_or_default();
        Notice::Saved {
            book_id: pending.book.id.clone(),
            undo_deadline,
        }
    }

    /// Reconcile the local copy with the outcome of `pending`.
    ///
    /// If `pending` was undone or edited again meanwhile, an accepted save
    /// still lands: with no newer edit the server copy replaces the local
    /// one, otherwise the newer edit is rebased onto it. Other outcomes of a
    /// superseded save leave local state alone but are still reported.
    pub fn resolve(&mut self, pending: &PendingSave, outcome: &SaveOutcome) -> Notice {
        let id = &pending.book.id;
        if !self.is_current(id, pending.ticket) {
            return self.resolve_superseded(pending, outcome);
        }

        match outcome {
            SaveOutcome::Success { book, new_version } => {
                self.replace(book.clone());
                self.rollbacks.remove(id);
                Notice::Synced {
                    book_id: id.clone(),
                    version: *new_version,
                }
            }
            SaveOutcome::Conflict { server_book } => {
                self.mark(id, RollbackState::Conflicted);
                Notice::Conflict {
                    book_id: id.clone(),
                    server_book: server_book.clone(),
                }
            }
            SaveOutcome::Failure { error } => {
                self.mark(id, RollbackState::Failed);
                Notice::SaveFailed {
                    book_id: id.clone(),
                    message: error.clone(),
                    unexpected: false,
                }
            }
        }
    }

    /// Reconcile after an unexpected error; handled like a failure.
    pub fn resolve_error(&mut self, pending: &PendingSave, error: &dyn std::error::Error) -> Notice {
        let id = &pending.book.id;
        if !self.is_current(id, pending.ticket) {
            return self.superseded(id, pending.ticket, OutcomeKind::Error);
        }

        self.mark(id, RollbackState::Failed);
        Notice::SaveFailed {
            book_id: id.clone(),
            message: error.to_string(),
            unexpected: true,
        }
    }

    /// Restore the pre-edit snapshot of `id`.
    ///
    /// In flight, the undo offer expires at its deadline. After a failure or
    /// conflict the rollback stays available until used.
    pub fn undo(&mut self, id: &str, now: Timestamp) -> Result<Book> {
        let rollback = self
            .rollbacks
            .get(id)
            .ok_or_else(|| Error::NothingToUndo(id.to_string()))?;

        if rollback.state == RollbackState::InFlight && now > rollback.undo_deadline {
            return Err(Error::UndoExpired(id.to_string()));
        }

        let previous = rollback.previous.clone();
        self.rollbacks.remove(id);
        self.replace(previous.clone());
        Ok(previous)
    }

    /// Drop the rollback for `id` without restoring it.
    pub fn discard_rollback(&mut self, id: &str) -> bool {
        self.rollbacks.remove(id).is_some()
    }

    /// Overwrite the local copy with the store's snapshot (resolve a conflict
    /// in the store's favour).
    pub fn accept_server(&mut self, server_book: Book) {
        self.rollbacks.remove(&server_book.id);
        self.replace(server_book);
    }

    fn resolve_superseded(&mut self, pending: &PendingSave, outcome: &SaveOutcome) -> Notice {
        let id = &pending.book.id;
        let kind = match outcome {
            SaveOutcome::Success { book, .. } => {
                match self.rollbacks.get_mut(id) {
                    Some(rollback) => {
                        // The newer edit now sits on top of the accepted copy.
                        rollback.previous = book.clone();
                        if let Some(local) = self.books.iter_mut().find(|b| b.id == *id) {
                            local.version = book.version;
                        }
                    }
                    None => self.replace(book.clone()),
                }
                OutcomeKind::Success
            }
            SaveOutcome::Failure { .. } => OutcomeKind::Failure,
            SaveOutcome::Conflict { .. } => OutcomeKind::Conflict,
        };
        self.superseded(id, pending.ticket, kind)
    }

    fn superseded(&self, id: &BookId, ticket: Ticket, outcome: OutcomeKind) -> Notice {
        Notice::Superseded {
            book_id: id.clone(),
            ticket,
            outcome,
            rollback_available: self.rollbacks.contains_key(id),
        }
    }

    fn is_current(&self, id: &str, ticket: Ticket) -> bool {
        self.rollbacks
            .get(id)
            .map(|r| r.ticket == ticket)
            .unwrap_or(false)
    }

    fn mark(&mut self, id: &str, state: RollbackState) {
        if let Some(rollback) = self.rollbacks.get_mut(id) {
            rollback.state = state;
        }
    }

    fn replace(&mut self, book: Book) {
        if let Some(slot) = self.books.iter_mut().find(|b| b.id == book.id) {
            *slot = book;
        }
    }
}
