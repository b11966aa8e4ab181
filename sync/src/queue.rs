//! Per-book save queue.
//!
//! Every book ID gets its own chain: an unbounded channel drained by a single
//! worker task. Saves for one book run strictly one after another in
//! submission order; chains for different books run concurrently.

use std::sync::Arc;

use dashmap::DashMap;
use shelf_engine::{Book, BookId, SaveOutcome, Version};
use tokio::sync::{mpsc, oneshot};

use crate::error::{Result, SyncError};
use crate::remote::RemoteStore;

/// Sender side of a book's chain.
type ChainSender = mpsc::UnboundedSender<SaveTask>;

/// A save waiting its turn in a chain.
#[derive(Debug)]
struct SaveTask {
    book: Book,
    client_version: Version,
    reply: oneshot::Sender<Result<SaveOutcome>>,
}

/// Handle to the outcome of one submitted save.
#[derive(Debug)]
pub struct SaveHandle {
    book_id: BookId,
    rx: oneshot::Receiver<Result<SaveOutcome>>,
}

impl SaveHandle {
    pub fn book_id(&self) -> &BookId {
        &self.book_id
    }

    /// Wait for this save (and only this save) to resolve.
    pub async fn outcome(self) -> Result<SaveOutcome> {
        self.rx
            .await
            .map_err(|_| SyncError::QueueClosed(self.book_id))?
    }
}

/// Serializes saves per book ID.
///
/// Thread-safe and can be shared across tasks via `Arc`. Must be used from
/// within a tokio runtime, since chains are spawned lazily.
#[derive(Debug)]
pub struct SaveQueue {
    remote: Arc<RemoteStore>,
    chains: DashMap<BookId, ChainSender>,
}

impl SaveQueue {
    pub fn new(remote: Arc<RemoteStore>) -> Self {
        Self {
            remote,
            chains: DashMap::new(),
        }
    }

    /// Seed the remote store. The queue itself holds no book state.
    pub fn initialize_with(&self, books: impl IntoIterator<Item = Book>) {
        self.remote.initialize(books);
    }

    /// Append a save to the chain of `book.id`.
    ///
    /// The call itself fixes the position in the chain; the returned handle
    /// resolves once the save has run, whatever its outcome. Failed and
    /// conflicting saves do not hold up later ones.
    pub fn submit(&self, book: Book, client_version: Version) -> SaveHandle {
        let book_id = book.id.clone();
        let (reply, rx) = oneshot::channel();
        let task = SaveTask {
            book,
            client_version,
            reply,
        };

        // The entry guard is held across the send so that concurrent
        // submitters for one book are ordered by the shard lock.
        let mut chain = self
            .chains
            .entry(book_id.clone())
            .or_insert_with(|| self.spawn_chain(book_id.clone()));

        if let Err(mpsc::error::SendError(task)) = chain.send(task) {
            tracing::warn!(book_id = %book_id, "Save chain gone, restarting");
            *chain = self.spawn_chain(book_id.clone());
            // A fresh chain only rejects if its worker died already; the
            // dropped reply then surfaces as QueueClosed.
            if chain.send(task).is_err() {
                tracing::warn!(book_id = %book_id, "Save chain restart failed, dropping save");
            }
        }

        tracing::debug!(book_id = %book_id, client_version, "Save submitted");

        SaveHandle { book_id, rx }
    }

    /// Number of books with a running chain.
    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    fn spawn_chain(&self, book_id: BookId) -> ChainSender {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_chain(book_id.clone(), self.remote.clone(), rx));
        tracing::debug!(book_id = %book_id, "Save chain started");
        tx
    }
}

async fn run_chain(
    book_id: BookId,
    remote: Arc<RemoteStore>,
    mut rx: mpsc::UnboundedReceiver<SaveTask>,
) {
    while let Some(task) = rx.recv().await {
        let result = remote.attempt_save(&task.book, task.client_version).await;

        if let Err(e) = &result {
            tracing::warn!(book_id = %book_id, error = %e, "Save raised an error");
        }

        if task.reply.send(result).is_err() {
            tracing::debug!(book_id = %book_id, "Save handle dropped before outcome");
        }
    }

    tracing::debug!(book_id = %book_id, "Save chain closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::FixedNetwork;
    use std::time::Duration;

    fn queue(delay_ms: u64) -> SaveQueue {
        let network = Arc::new(FixedNetwork::new(Duration::from_millis(delay_ms)));
        SaveQueue::new(RemoteStore::new_shared(network))
    }

    fn book(id: &str, version: Version) -> Book {
        Book::new(id, "Title", "Author").with_version(version)
    }

    #[tokio::test(start_paused = true)]
    async fn one_chain_per_book() {
        let queue = queue(10);

        let a = queue.submit(book("a", 0), 0);
        let b = queue.submit(book("b", 0), 0);
        let a2 = queue.submit(book("a", 1), 1);

        assert_eq!(queue.chain_count(), 2);
        assert_eq!(a.book_id(), "a");
        assert!(a.outcome().await.unwrap().is_success());
        assert!(b.outcome().await.unwrap().is_success());
        assert_eq!(a2.outcome().await.unwrap().server_version(), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_handle_still_runs() {
        let network = Arc::new(FixedNetwork::new(Duration::from_millis(10)));
        let remote = RemoteStore::new_shared(network);
        let queue = SaveQueue::new(remote.clone());

        drop(queue.submit(book("a", 0), 0));
        let next = queue.submit(book("a", 1), 1);

        assert_eq!(next.outcome().await.unwrap().server_version(), Some(2));
        assert_eq!(remote.accepted_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn error_does_not_block_chain() {
        let queue = queue(10);
        queue.initialize_with(vec![book("a", 0)]);

        let mut malformed = book("a", 0);
        malformed.title.clear();
        let bad = queue.submit(malformed, 0);
        let good = queue.submit(book("a", 0), 0);

        assert!(bad.outcome().await.is_err());
        assert!(good.outcome().await.unwrap().is_success());
    }
    #[tokio::test(start_paused = true)]
    async fn dead_chain_is_restarted() {
        let queue = queue(10);
        let (dead, rx) = mpsc::unbounded_channel();
        drop(rx);
        queue.chains.insert("a".to_string(), dead);

        let handle = queue.submit(book("a", 0), 0);

        assert!(handle.outcome().await.unwrap().is_success());
        assert_eq!(queue.chain_count(), 1);
    }
}
