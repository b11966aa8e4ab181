//! Shelf Sync demo - drives a few concurrent optimistic saves through the
//! simulated remote and prints the resulting collection.

use std::sync::Arc;

use futures::future::join_all;
use shelf_engine::{BookEdit, Notice, Status};
use shelf_sync::{BookService, LibraryClient, SyncConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shelf_sync=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = SyncConfig::from_env()?;

    tracing::info!(
        failure_rate = config.failure_rate,
        latency_min = ?config.latency_min,
        latency_max = ?config.latency_max,
        "Starting Shelf sync demo"
    );

    let service = Arc::new(BookService::from_config(config));
    let client = Arc::new(LibraryClient::start(service).await?);

    let books = client.books();
    let Some(first) = books.first().map(|b| b.id.clone()) else {
        tracing::warn!("Seed data is empty, nothing to do");
        return Ok(());
    };

    // One edit per book, plus a second edit on the first book submitted
    // right behind the first one. Both carry the same base version, so the
    // second lands on a newer store version and conflicts.
    let mut saves = Vec::new();
    for (i, book) in books.iter().enumerate() {
        let status = match i % 3 {
            0 => Status::Reading,
            1 => Status::Done,
            _ => Status::Unread,
        };
        let edit = BookEdit::new()
            .status(status)
            .notes(format!("Edited in demo run {}", i));
        saves.push((book.id.clone(), edit));
    }
    saves.push((first, BookEdit::new().notes("Second thoughts")));

    let mut pending = Vec::new();
    for (id, edit) in &saves {
        let (save, notice) = client.begin(id, edit)?;
        tracing::info!(book_id = %id, "{}", notice.message());
        pending.push(save);
    }

    let notices = join_all(pending.iter().map(|save| client.complete(save))).await;

    // Roll back anything that did not make it.
    for notice in &notices {
        if let Notice::SaveFailed { book_id, .. } = notice {
            if let Err(e) = client.undo(book_id) {
                tracing::warn!(book_id = %book_id, error = %e, "Rollback unavailable");
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&client.books())?);

    Ok(())
}
