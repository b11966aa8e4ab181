//! Simulated remote store.
//!
//! Wraps the engine's [`RecordStore`] with network latency and transient
//! failures drawn from a [`NetworkSimulator`].

use std::sync::{Arc, Mutex, MutexGuard};

use shelf_engine::{Book, RecordStore, SaveOutcome, Version};

use crate::error::Result;
use crate::network::NetworkSimulator;

/// Error text reported for simulated transient failures.
pub const NETWORK_ERROR: &str = "Network error";

/// The authoritative side of the sync layer.
///
/// Snapshots are only mutated from within a save chain, one chain per book,
/// so the lock is never contended for the same book.
pub struct RemoteStore {
    store: Mutex<RecordStore>,
    network: Arc<dyn NetworkSimulator>,
}

impl std::fmt::Debug for RemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStore")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl RemoteStore {
    pub fn new(network: Arc<dyn NetworkSimulator>) -> Self {
        Self {
            store: Mutex::new(RecordStore::new()),
            network,
        }
    }

    /// Create a remote store wrapped in Arc for sharing.
    pub fn new_shared(network: Arc<dyn NetworkSimulator>) -> Arc<Self> {
        Arc::new(Self::new(network))
    }

    /// Bulk-load snapshots, replacing existing ones with the same ID.
    pub fn initialize(&self, books: impl IntoIterator<Item = Book>) {
        let mut store = self.lock();
        store.initialize(books);
        tracing::info!(books = store.len(), "Remote store initialized");
    }

    /// One simulated round trip: wait, maybe fail, then adjudicate.
    pub async fn attempt_save(&self, book: &Book, client_version: Version) -> Result<SaveOutcome> {
        let delay = self.network.delay();
        tokio::time::sleep(delay).await;

        if self.network.should_fail() {
            tracing::debug!(book_id = %book.id, ?delay, "Simulated network failure");
            return Ok(SaveOutcome::Failure {
                error: NETWORK_ERROR.to_string(),
            });
        }

        let mut store = self.lock();

        if let Some(stored) = store.version_of(&book.id) {
            if client_version > stored {
                tracing::warn!(
                    book_id = %book.id,
                    client_version,
                    stored_version = stored,
                    "Client version ahead of store, accepting at stored + 1"
                );
            }
        }

        let outcome = store.attempt_save(book, client_version)?;
        match &outcome {
            SaveOutcome::Success { new_version, .. } => {
                tracing::debug!(book_id = %book.id, client_version, new_version, ?delay, "Save accepted");
            }
            SaveOutcome::Conflict { server_book } => {
                tracing::debug!(
                    book_id = %book.id,
                    client_version,
                    stored_version = server_book.version,
                    "Save conflicted"
                );
            }
            SaveOutcome::Failure { .. } => {}
        }

        Ok(outcome)
    }

    /// Copy of the current snapshot for `id`.
    pub fn snapshot(&self, id: &str) -> Option<Book> {
        self.lock().snapshot(id)
    }

    /// Number of saves accepted so far.
    pub fn accepted_count(&self) -> u64 {
        self.lock().accepted_count()
    }

    /// Number of stored books.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the store holds no books.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, RecordStore> {
        self.store
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
