//! # Shelf Engine
//!
//! The deterministic core of Shelf's optimistic save pipeline.
//!
//! This crate decides what happens to a book save, and how the client's local
//! copy follows along. It performs no IO, no sleeping and no clock reads; time
//! is passed in as milliseconds so every path is reproducible in tests.
//!
//! ## Core Concepts
//!
//! ### Books
//!
//! A [`Book`] carries an identifier, descriptive fields, a reading
//! [`Status`] and an integer version used for optimistic concurrency.
//!
//! ### Record Store
//!
//! The [`RecordStore`] holds the authoritative copy of every book. A save
//! names the version its author last saw:
//! - unknown book: accepted at `client_version + 1`
//! - `client_version < stored`: [`SaveOutcome::Conflict`]
//! - otherwise: accepted at `stored + 1`
//!
//! ### Library
//!
//! The [`Library`] is the client-side collection. It applies edits before the
//! store confirms them, keeps the pre-edit snapshot for rollback, and turns
//! every [`SaveOutcome`] into a [`Notice`].
//!
//! ## Quick Start
//!
//! ```rust
//! use shelf_engine::{Book, BookEdit, Library, RecordStore, Status};
//!
//! let seed = vec![Book::new("b1", "Dune", "Frank Herbert").with_version(2)];
//!
//! let mut store = RecordStore::new();
//! store.initialize(seed.clone());
//!
//! let mut library = Library::default();
//! library.load(seed);
//!
//! let pending = library
//!     .begin_save("b1", &BookEdit::new().status(Status::Reading), 1_000)
//!     .unwrap();
//! let outcome = store
//!     .attempt_save(&pending.book, pending.base_version)
//!     .unwrap();
//! library.resolve(&pending, &outcome);
//!
//! assert_eq!(library.get("b1").unwrap().version, 3);
//! ```

pub mod book;
pub mod error;
pub mod library;
pub mod outcome;
pub mod store;

// Re-export main types at crate root
pub use book::{Book, BookEdit, Status};
pub use error::Error;
pub use library::{
    Library, Notice, OutcomeKind, PendingSave, RollbackState, Ticket, DEFAULT_UNDO_WINDOW_MS,
};
pub use outcome::SaveOutcome;
pub use store::RecordStore;

/// Type aliases for clarity
pub type BookId = String;
pub type Version = u64;
pub type Timestamp = u64;
