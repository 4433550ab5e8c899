//! Reading list for Quillpost.
//!
//! Implements `BookmarkManagerTrait`: an insertion-ordered list of saved
//! article snapshots, capped at [`MAX_BOOKMARKS`], persisted as one JSON
//! record in local storage.

use rusqlite::Connection;
use serde::Serialize;

use crate::database::local_storage::{keys, LocalStorage};
use crate::types::bookmark::BookmarkEntry;
use crate::types::errors::BookmarkError;

/// Maximum number of saved articles.
pub const MAX_BOOKMARKS: usize = 10;

/// Result of [`BookmarkManagerTrait::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOutcome {
    Added,
    AlreadySaved,
    LimitReached,
}

/// Result of [`BookmarkManagerTrait::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoveOutcome {
    Removed,
    NotSaved,
}

/// Result of [`BookmarkManagerTrait::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Added,
    Removed,
    LimitReached,
}

impl AddOutcome {
    /// Confirmation text shown to the reader.
    pub fn message(&self) -> &'static str {
        match self {
            AddOutcome::Added => "Article saved to your reading list",
            AddOutcome::AlreadySaved => "Article is already in your reading list",
            AddOutcome::LimitReached => "Reading list is full (10 articles max)",
        }
    }
}

impl RemoveOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            RemoveOutcome::Removed => "Article removed from your reading list",
            RemoveOutcome::NotSaved => "Article was not in your reading list",
        }
    }
}

impl ToggleOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            ToggleOutcome::Added => AddOutcome::Added.message(),
            ToggleOutcome::Removed => RemoveOutcome::Removed.message(),
            ToggleOutcome::LimitReached => AddOutcome::LimitReached.message(),
        }
    }

    pub fn is_bookmarked(&self) -> bool {
        matches!(self, ToggleOutcome::Added)
    }
}

/// Trait defining reading-list operations.
pub trait BookmarkManagerTrait {
    fn add(&mut self, entry: BookmarkEntry) -> Result<AddOutcome, BookmarkError>;
    fn remove(&mut self, article_id: &str) -> Result<RemoveOutcome, BookmarkError>;
    fn toggle(&mut self, entry: BookmarkEntry) -> Result<ToggleOutcome, BookmarkError>;
    fn is_bookmarked(&self, article_id: &str) -> bool;
    fn clear(&mut self) -> Result<(), BookmarkError>;
    fn list(&self) -> &[BookmarkEntry];
}

/// Reading list backed by the local storage record `bookmarks`.
pub struct BookmarkManager<'a> {
    storage: LocalStorage<'a>,
    entries: Vec<BookmarkEntry>,
}

impl<'a> BookmarkManager<'a> {
    /// Loads the persisted list from `conn`.
    ///
    /// An unreadable record is logged and treated as an empty list.
    pub fn new(conn: &'a Connection) -> Self {
        let storage = LocalStorage::new(conn);
        let entries = Self::load(&storage);
        Self { storage, entries }
    }

    fn load(storage: &LocalStorage<'_>) -> Vec<BookmarkEntry> {
        let raw = match storage.get(keys::BOOKMARKS) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(%e, "failed to read reading list, starting empty");
                return Vec::new();
            }
        };

        let parsed: Vec<BookmarkEntry> = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(%e, "ignoring malformed reading list record");
                return Vec::new();
            }
        };

        let mut entries: Vec<BookmarkEntry> = Vec::with_capacity(MAX_BOOKMARKS);
        for entry in parsed {
            if entries.len() == MAX_BOOKMARKS {
                tracing::warn!("stored reading list exceeds {} entries, truncating", MAX_BOOKMARKS);
                break;
            }
            if !entries.iter().any(|e| e.id == entry.id) {
                entries.push(entry);
            }
        }
        entries
    }

    /// Writes `entries` and only then makes them current.
    fn commit(&mut self, entries: Vec<BookmarkEntry>) -> Result<(), BookmarkError> {
        let json = serde_json::to_string(&entries)
            .map_err(|e| BookmarkError::SerializationError(e.to_string()))?;
        self.storage.set(keys::BOOKMARKS, &json)?;
        self.entries = entries;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_BOOKMARKS
    }

    /// How many more articles can be saved.
    pub fn remaining(&self) -> usize {
        MAX_BOOKMARKS.saturating_sub(self.entries.len())
    }
}

impl<'a> BookmarkManagerTrait for BookmarkManager<'a> {
    fn add(&mut self, entry: BookmarkEntry) -> Result<AddOutcome, BookmarkError> {
        if self.is_bookmarked(&entry.id) {
            return Ok(AddOutcome::AlreadySaved);
        }
        if self.is_full() {
            tracing::info!(article_id = %entry.id, "reading list full, not saving");
            return Ok(AddOutcome::LimitReached);
        }

        let article_id = entry.id.clone();
        let mut next = self.entries.clone();
        next.push(entry);
        self.commit(next)?;

        tracing::info!(%article_id, "{}", AddOutcome::Added.message());
        Ok(AddOutcome::Added)
    }

    fn remove(&mut self, article_id: &str) -> Result<RemoveOutcome, BookmarkError> {
        if !self.is_bookmarked(article_id) {
            return Ok(RemoveOutcome::NotSaved);
        }

        let next: Vec<BookmarkEntry> = self
            .entries
            .iter()
            .filter(|e| e.id != article_id)
            .cloned()
            .collect();
        self.commit(next)?;

        tracing::info!(%article_id, "{}", RemoveOutcome::Removed.message());
        Ok(RemoveOutcome::Removed)
    }

    fn toggle(&mut self, entry: BookmarkEntry) -> Result<ToggleOutcome, BookmarkError> {
        if self.is_bookmarked(&entry.id) {
            self.remove(&entry.id)?;
            return Ok(ToggleOutcome::Removed);
        }
        match self.add(entry)? {
            AddOutcome::LimitReached => Ok(ToggleOutcome::LimitReached),
            AddOutcome::Added | AddOutcome::AlreadySaved => Ok(ToggleOutcome::Added),
        }
    }

    fn is_bookmarked(&self, article_id: &str) -> bool {
        self.entries.iter().any(|e| e.id == article_id)
    }

    /// Empties the list and deletes the persisted record.
    fn clear(&mut self) -> Result<(), BookmarkError> {
        self.storage.remove(keys::BOOKMARKS)?;
        self.entries.clear();
        tracing::info!("reading list cleared");
        Ok(())
    }

    fn list(&self) -> &[BookmarkEntry] {
        &self.entries
    }
}
