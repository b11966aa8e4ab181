//! Book service - the explicitly constructed entry point of the sync layer.

use std::sync::Arc;

use shelf_engine::{Book, SaveOutcome, Version};

use crate::config::SyncConfig;
use crate::error::Result;
use crate::network::{NetworkSimulator, RandomNetwork};
use crate::queue::{SaveHandle, SaveQueue};
use crate::remote::RemoteStore;

/// Bundled seed data set.
const SEED_BOOKS: &str = include_str!("../data/books.json");

/// Owns the simulated remote and the save queue in front of it.
///
/// Construct one at startup and share it via `Arc`.
#[derive(Debug)]
pub struct BookService {
    config: Arc<SyncConfig>,
    remote: Arc<RemoteStore>,
    queue: SaveQueue,
}

impl BookService {
    /// Create a service whose round trips are driven by `network`.
    pub fn new(config: SyncConfig, network: Arc<dyn NetworkSimulator>) -> Self {
        let remote = RemoteStore::new_shared(network);
        Self {
            config: Arc::new(config),
            queue: SaveQueue::new(remote.clone()),
            remote,
        }
    }

    /// Create a service with random latency and failures taken from `config`.
    pub fn from_config(config: SyncConfig) -> Self {
        let network = Arc::new(RandomNetwork::from_config(&config));
        Self::new(config, network)
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Load the bundled seed data after a short simulated delay.
    pub async fn load_seed(&self) -> Result<Vec<Book>> {
        tokio::time::sleep(self.config.seed_delay).await;
        let books = parse_seed(SEED_BOOKS)?;
        tracing::info!(books = books.len(), "Seed data loaded");
        Ok(books)
    }

    /// Seed the remote store.
    pub fn initialize_with(&self, books: &[Book]) {
        self.queue.initialize_with(books.iter().cloned());
    }

    /// Queue a save and return a handle to its outcome.
    pub fn submit(&self, book: Book, believed_version: Version) -> SaveHandle {
        self.queue.submit(book, believed_version)
    }

    /// Queue a save and wait for its outcome.
    pub async fn request_save(&self, book: Book, believed_version: Version) -> Result<SaveOutcome> {
        self.submit(book, believed_version).outcome().await
    }

    /// The remote's current copy of a book.
    pub fn snapshot(&self, id: &str) -> Option<Book> {
        self.remote.snapshot(id)
    }

    pub fn remote(&self) -> &Arc<RemoteStore> {
        &self.remote
    }
}

fn parse_seed(raw: &str) -> Result<Vec<Book>> {
    Ok(serde_json::from_str(raw)?)
}
