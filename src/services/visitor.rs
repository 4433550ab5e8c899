//! Per-device reader identity and view bookkeeping.

use uuid::Uuid;

use crate::database::local_storage::{keys, LocalStorage};
use crate::types::errors::StorageError;

/// Cap on remembered viewed ids; the oldest are forgotten first.
pub const MAX_VIEWED_ARTICLES: usize = 500;

/// Returns this device's visitor id, creating and storing one on first use.
pub fn visitor_id(storage: &LocalStorage<'_>) -> Result<String, StorageError> {
    if let Some(id) = storage.get(keys::VISITOR_ID)? {
        if Uuid::parse_str(&id).is_ok() {
            return Ok(id);
        }
        tracing::warn!("replacing malformed visitor id");
    }
    let id = Uuid::new_v4().to_string();
    storage.set(keys::VISITOR_ID, &id)?;
    Ok(id)
}

fn viewed_ids(storage: &LocalStorage<'_>) -> Result<Vec<String>, StorageError> {
    let Some(raw) = storage.get(keys::VIEWED_ARTICLES)? else {
        return Ok(Vec::new());
    };
    Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!(%e, "ignoring malformed viewed-articles record");
        Vec::new()
    }))
}

/// Whether this device already counted a view of `article_id`.
pub fn has_viewed(storage: &LocalStorage<'_>, article_id: &str) -> Result<bool, StorageError> {
    Ok(viewed_ids(storage)?.iter().any(|id| id == article_id))
}

/// Remembers that `article_id` was viewed. Returns `false` if it already was.
pub fn mark_viewed(storage: &LocalStorage<'_>, article_id: &str) -> Result<bool, StorageError> {
    let mut ids = viewed_ids(storage)?;
    if ids.iter().any(|id| id == article_id) {
        return Ok(false);
    }
    ids.push(article_id.to_string());
    if ids.len() > MAX_VIEWED_ARTICLES {
        let excess = ids.len() - MAX_VIEWED_ARTICLES;
        ids.drain(..excess);
    }
    let json = serde_json::to_string(&ids).map_err(|e| StorageError::DatabaseError(e.to_string()))?;
    storage.set(keys::VIEWED_ARTICLES, &json)?;
    Ok(true)
}

/// Forgets `article_id`, so its next view is counted again.
pub fn unmark_viewed(storage: &LocalStorage<'_>, article_id: &str) -> Result<(), StorageError> {
    let mut ids = viewed_ids(storage)?;
    ids.retain(|id| id != article_id);
    let json = serde_json::to_string(&ids).map_err(|e| StorageError::DatabaseError(e.to_string()))?;
    storage.set(keys::VIEWED_ARTICLES, &json)
}
