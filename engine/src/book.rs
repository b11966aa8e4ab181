//! Book records tracked by the library.

use crate::{BookId, Timestamp, Version};
use serde::{Deserialize, Serialize};

/// Reading status of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Not started yet
    #[default]
    Unread,
    /// Currently being read
    Reading,
    /// Finished
    Done,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::Unread => "unread",
            Status::Reading => "reading",
            Status::Done => "done",
        };
        f.write_str(s)
    }
}

/// A book record, as held both by the client collection and the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique, stable identifier
    pub id: BookId,
    pub title: String,
    pub author: String,
    /// Free-text notes
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub status: Status,
    /// Last local modification (milliseconds since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<Timestamp>,
    /// Concurrency token, bumped by the store on every accepted save
    #[serde(default)]
    pub version: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

impl Book {
    /// Create a new unread book at version 0.
    pub fn new(
        id: impl Into<BookId>,
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            notes: String::new(),
            status: Status::Unread,
            last_updated: None,
            version: 0,
            cover_image: None,
        }
    }

    /// Builder-style version override.
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Builder-style notes override.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Builder-style status override.
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Return a copy with `edit` applied and `last_updated` stamped.
    ///
    /// The version is left as-is: an edited copy still carries the version it
    /// was based on until the store accepts it.
    pub fn edited(&self, edit: &BookEdit, timestamp: Timestamp) -> Self {
        let mut book = self.clone();
        if let Some(status) = edit.status {
            book.status = status;
        }
        if let Some(notes) = &edit.notes {
            book.notes = notes.clone();
        }
        book.last_updated = Some(timestamp);
        book
    }
}

/// The locally editable fields of a book. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BookEdit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_book_defaults() {
        let book = Book::new("b1", "Dune", "Frank Herbert");

        assert_eq!(book.id, "b1");
        assert_eq!(book.version, 0);
        assert_eq!(book.status, Status::Unread);
        assert!(book.notes.is_empty());
        assert!(book.last_updated.is_none());
    }

    #[test]
    fn edit_keeps_version_and_untouched_fields() {
        let book = Book::new("b1", "Dune", "Frank Herbert")
            .with_version(4)
            .with_notes("spice");

        let edited = book.edited(&BookEdit::new().status(Status::Reading), 1000);

        assert_eq!(edited.version, 4);
        assert_eq!(edited.status, Status::Reading);
        assert_eq!(edited.notes, "spice");
        assert_eq!(edited.last_updated, Some(1000));
        assert_eq!(edited.title, book.title);
    }

    #[test]
    fn deserialize_seed_shape() {
        let value = json!({
            "id": "/works/OL1W",
            "title": "Test",
            "author": "A",
            "status": "done",
            "notes": "",
            "version": 2,
            "coverImage": null
        });

        let book: Book = serde_json::from_value(value).unwrap();
        assert_eq!(book.status, Status::Done);
        assert_eq!(book.version, 2);
        assert!(book.cover_image.is_none());
    }

    #[test]
    fn status_display_matches_wire() {
        for status in [Status::Unread, Status::Reading, Status::Done] {
            let wire = serde_json::to_value(status).unwrap();
            assert_eq!(wire, json!(status.to_string()));
        }
    }
}
