//! Shelf Sync - the asynchronous side of Shelf's optimistic save pipeline.
//!
//! A simulated remote store sits behind a per-book save queue. Saves for one
//! book run strictly in submission order; saves for different books overlap.
//! The [`LibraryClient`] applies edits locally first and reconciles them with
//! the outcome of each save.

pub mod client;
pub mod config;
pub mod error;
pub mod network;
pub mod queue;
pub mod remote;
pub mod service;

pub use client::{LibraryClient, SaveReport};
pub use config::{ConfigError, SyncConfig};
pub use error::{Result, SyncError};
pub use network::{FixedNetwork, NetworkSimulator, RandomNetwork, ScriptedNetwork};
pub use queue::{SaveHandle, SaveQueue};
pub use remote::{RemoteStore, NETWORK_ERROR};
pub use service::BookService;
