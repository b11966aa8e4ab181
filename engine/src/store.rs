//! Store - the authoritative, versioned copy of every book.
//!
//! The store adjudicates saves with single-writer optimistic concurrency:
//! a save carries the version its author last saw, and it is accepted only
//! if that version is not older than the stored one. Latency and transient
//! failure live outside the engine; this type is the deterministic part.

use crate::{error::Result, Book, BookId, Error, SaveOutcome, Version};
use std::collections::HashMap;

/// Authoritative snapshots keyed by book ID.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    books: HashMap<BookId, Book>,
    /// Number of accepted saves since creation
    accepted: u64,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            books: HashMap::new(),
            accepted: 0,
        }
    }

    /// Bulk-load snapshots, keeping each book's version as given.
    ///
    /// Replaces any snapshot already stored under the same ID.
    pub fn initialize(&mut self, books: impl IntoIterator<Item = Book>) {
        for book in books {
            self.books.insert(book.id.clone(), book);
        }
    }

    /// Adjudicate a save of `book` based on `client_version`.
    ///
    /// - Unknown ID: accepted unconditionally at `client_version + 1`.
    /// - `client_version < stored`: [`SaveOutcome::Conflict`] with the stored copy.
    /// - Otherwise accepted at `stored + 1`.
    ///
    /// Malformed input is an `Err` and leaves the store untouched.
    pub fn attempt_save(&mut self, book: &Book, client_version: Version) -> Result<SaveOutcome> {
        validate(book)?;

        let new_version = match self.books.get(&book.id) {
            None => next_version(client_version)?,
            Some(stored) if client_version < stored.version => {
                return Ok(SaveOutcome::Conflict {
                    server_book: stored.clone(),
                });
            }
            Some(stored) => next_version(stored.version)?,
        };

        let accepted = Book {
            version: new_version,
            ..book.clone()
        };
        self.books.insert(accepted.id.clone(), accepted.clone());
        self.accepted += 1;

        Ok(SaveOutcome::Success {
            book: accepted,
            new_version,
        })
    }

    /// Copy of the current snapshot for `id`.
    pub fn snapshot(&self, id: &str) -> Option<Book> {
        self.books.get(id).cloned()
    }

    /// Current stored version for `id`.
    pub fn version_of(&self, id: &str) -> Option<Version> {
        self.books.get(id).map(|b| b.version)
    }

    /// Check if a snapshot exists.
    pub fn contains(&self, id: &str) -> bool {
        self.books.contains_key(id)
    }

    /// Number of stored books.
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Check if the store holds no books.
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Number of saves accepted so far.
    pub fn accepted_count(&self) -> u64 {
        self.accepted
    }

    /// All snapshots, sorted by ID.
    pub fn all(&self) -> Vec<Book> {
        let mut books: Vec<_> = self.books.values().cloned().collect();
        books.sort_by(|a, b| a.id.cmp(&b.id));
        books
    }
}

fn validate(book: &Book) -> Result<()> {
    if book.id.trim().is_empty() {
        return Err(Error::InvalidBook("empty id".into()));
    }
    if book.title.trim().is_empty() {
        return Err(Error::InvalidBook(format!("empty title for {}", book.id)));
    }
    Ok(())
}

fn next_version(version: Version) -> Result<Version> {
    version
        .checked_add(1)
        .ok_or_else(|| Error::InvalidBook(format!("version overflow at {}", version)))
}
