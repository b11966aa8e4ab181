//! Library client - optimistic saves against the book service.
//!
//! Couples the engine's [`Library`] with a [`BookService`]: edits land in the
//! local collection immediately, are queued for the remote, and every outcome
//! is reconciled back into a [`Notice`].

use std::sync::{Arc, Mutex, MutexGuard};

use shelf_engine::{Book, BookEdit, Library, Notice, PendingSave, Timestamp};

use crate::error::Result;
use crate::service::BookService;

/// The two notices of one save: shown on submit, and on resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub optimistic: Notice,
    pub resolved: Notice,
}

/// Client-side state plus the service it saves through.
#[derive(Debug)]
pub struct LibraryClient {
    service: Arc<BookService>,
    library: Mutex<Library>,
}

impl LibraryClient {
    /// Create a client with an empty collection.
    pub fn new(service: Arc<BookService>) -> Self {
        let library = Library::new(service.config().undo_window_ms);
        Self {
            service,
            library: Mutex::new(library),
        }
    }

    /// Load the seed into both the local collection and the remote store.
    pub async fn start(service: Arc<BookService>) -> Result<Self> {
        let client = Self::new(service);
        let books = client.service.load_seed().await?;
        client.load(books);
        Ok(client)
    }

    /// Replace both the local collection and the remote snapshots.
    pub fn load(&self, books: Vec<Book>) {
        self.service.initialize_with(&books);
        self.library().load(books);
    }

    pub fn service(&self) -> &Arc<BookService> {
        &self.service
    }

    /// Local copy of every book.
    pub fn books(&self) -> Vec<Book> {
        self.library().books().to_vec()
    }

    /// Local copy of one book.
    pub fn get(&self, id: &str) -> Option<Book> {
        self.library().get(id).cloned()
    }

    /// Apply `edit` locally and return the save to submit with its notice.
    pub fn begin(&self, id: &str, edit: &BookEdit) -> Result<(PendingSave, Notice)> {
        let mut library = self.library();
        let pending = library.begin_save(id, edit, now_millis())?;
        let notice = library.notice_for_begin(&pending);
        tracing::info!(book_id = %id, ticket = pending.ticket, base_version = pending.base_version, "Optimistic save applied");
        Ok((pending, notice))
    }

    /// Submit `pending` and reconcile its outcome.
    pub async fn complete(&self, pending: &PendingSave) -> Notice {
        let result = self
            .service
            .request_save(pending.book.clone(), pending.base_version)
            .await;

        let mut library = self.library();
        let notice = match result {
            Ok(outcome) => library.resolve(pending, &outcome),
            Err(e) => {
                tracing::error!(book_id = %pending.book.id, error = %e, "Save failed unexpectedly");
                library.resolve_error(pending, &e)
            }
        };
        drop(library);

        log_notice(&notice);
        notice
    }

    /// Full save: optimistic apply, queue, reconcile.
    pub async fn save(&self, id: &str, edit: &BookEdit) -> Result<SaveReport> {
        let (pending, optimistic) = self.begin(id, edit)?;
        let resolved = self.complete(&pending).await;
        Ok(SaveReport {
            optimistic,
            resolved,
        })
    }

    /// Restore the pre-edit snapshot of `id`.
    pub fn undo(&self, id: &str) -> Result<Book> {
        let book = self.library().undo(id, now_millis())?;
        tracing::info!(book_id = %id, version = book.version, "Save rolled back");
        Ok(book)
    }

    /// Resolve a conflict by taking the store's copy.
    pub fn accept_server(&self, server_book: Book) {
        tracing::info!(book_id = %server_book.id, version = server_book.version, "Accepted server copy");
        self.library().accept_server(server_book);
    }

    fn library(&self) -> MutexGuard<'_, Library> {
        self.library
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn log_notice(notice: &Notice) {
    match notice {
        Notice::Synced { book_id, version } => {
            tracing::info!(book_id = %book_id, version, "{}", notice.message());
        }
        Notice::Superseded {
            book_id,
            ticket,
            outcome,
            ..
        } => {
            if notice.is_unsuccessful() {
                tracing::warn!(book_id = %book_id, ticket, ?outcome, "{}", notice.message());
            } else {
                tracing::debug!(book_id = %book_id, ticket, "{}", notice.message());
            }
        }
        _ => {
            tracing::warn!(book_id = %notice.book_id(), "{}", notice.message());
        }
    }
}

fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis().max(0) as Timestamp
}
