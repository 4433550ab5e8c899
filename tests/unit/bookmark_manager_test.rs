//! Unit tests for the reading list public API.
//!
//! These tests exercise add/remove/toggle/clear through the
//! `BookmarkManagerTrait` interface, using an in-memory SQLite database.

use chrono::{TimeZone, Utc};
use quillpost::database::local_storage::keys;
use quillpost::database::{Database, LocalStorage};
use quillpost::managers::bookmark_manager::{
    AddOutcome, BookmarkManager, BookmarkManagerTrait, RemoveOutcome, ToggleOutcome, MAX_BOOKMARKS,
};
use quillpost::types::article::{Article, ArticleStatus};
use quillpost::types::bookmark::BookmarkEntry;

fn entry(id: &str) -> BookmarkEntry {
    BookmarkEntry {
        id: id.to_string(),
        title: format!("Article {}", id),
        slug: format!("article-{}", id),
        excerpt: None,
        cover_image: None,
        category: Some("Rust".to_string()),
        read_time: 4,
        view_count: 12,
        published_at: None,
        saved_at: Utc::now(),
    }
}

#[test]
fn test_add_then_is_bookmarked() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = BookmarkManager::new(db.connection());

    assert_eq!(mgr.add(entry("a")).unwrap(), AddOutcome::Added);
    assert!(mgr.is_bookmarked("a"));
    assert!(!mgr.is_bookmarked("b"));
    assert_eq!(mgr.len(), 1);
}

#[test]
fn test_add_duplicate_is_noop() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = BookmarkManager::new(db.connection());

    mgr.add(entry("a")).unwrap();
    assert_eq!(mgr.add(entry("a")).unwrap(), AddOutcome::AlreadySaved);
    assert_eq!(mgr.len(), 1);
}

#[test]
fn test_limit_reached_at_ten() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = BookmarkManager::new(db.connection());

    for i in 0..MAX_BOOKMARKS {
        assert_eq!(mgr.add(entry(&i.to_string())).unwrap(), AddOutcome::Added);
    }
    assert!(mgr.is_full());
    assert_eq!(mgr.add(entry("overflow")).unwrap(), AddOutcome::LimitReached);
    assert!(!mgr.is_bookmarked("overflow"));
    assert_eq!(mgr.len(), MAX_BOOKMARKS);
}

#[test]
fn test_remove_present_and_absent() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = BookmarkManager::new(db.connection());

    mgr.add(entry("a")).unwrap();
    assert_eq!(mgr.remove("a").unwrap(), RemoveOutcome::Removed);
    assert_eq!(mgr.remove("a").unwrap(), RemoveOutcome::NotSaved);
    assert!(mgr.is_empty());
}

#[test]
fn test_toggle_adds_then_removes() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = BookmarkManager::new(db.connection());

    assert_eq!(mgr.toggle(entry("a")).unwrap(), ToggleOutcome::Added);
    assert!(mgr.is_bookmarked("a"));
    assert_eq!(mgr.toggle(entry("a")).unwrap(), ToggleOutcome::Removed);
    assert!(!mgr.is_bookmarked("a"));
}

#[test]
fn test_toggle_on_full_list_reports_limit() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = BookmarkManager::new(db.connection());
    for i in 0..MAX_BOOKMARKS {
        mgr.add(entry(&i.to_string())).unwrap();
    }

    let outcome = mgr.toggle(entry("new")).unwrap();
    assert_eq!(outcome, ToggleOutcome::LimitReached);
    assert!(!outcome.is_bookmarked());
    // Removing through toggle still works when full.
    assert_eq!(mgr.toggle(entry("3")).unwrap(), ToggleOutcome::Removed);
}

#[test]
fn test_insertion_order_kept() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = BookmarkManager::new(db.connection());
    for id in ["c", "a", "b"] {
        mgr.add(entry(id)).unwrap();
    }
    let ids: Vec<&str> = mgr.list().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
}

#[test]
fn test_clear_removes_persisted_record() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = BookmarkManager::new(db.connection());
    mgr.add(entry("a")).unwrap();
    mgr.add(entry("b")).unwrap();

    mgr.clear().unwrap();
    assert!(mgr.is_empty());
    assert!(!mgr.is_bookmarked("a"));
    assert_eq!(LocalStorage::new(db.connection()).get(keys::BOOKMARKS).unwrap(), None);
}

#[test]
fn test_changes_visible_to_new_manager() {
    let db = Database::open_in_memory().unwrap();
    {
        let mut mgr = BookmarkManager::new(db.connection());
        mgr.add(entry("a")).unwrap();
        mgr.add(entry("b")).unwrap();
        mgr.remove("a").unwrap();
    }
    let mgr = BookmarkManager::new(db.connection());
    assert_eq!(mgr.len(), 1);
    assert_eq!(mgr.list()[0].id, "b");
    assert_eq!(mgr.list()[0].category.as_deref(), Some("Rust"));
}

#[test]
fn test_entry_from_article_snapshot() {
    let published = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
    let article = Article {
        id: "42".to_string(),
        title: "Ownership in practice".to_string(),
        slug: "ownership-in-practice".to_string(),
        excerpt: Some("Borrowing without tears".to_string()),
        content: "<p>Body</p>".to_string(),
        cover_image: None,
        category: Some("Rust".to_string()),
        tags: vec!["memory".to_string()],
        status: ArticleStatus::Published,
        read_time: 7,
        view_count: 100,
        like_count: 5,
        author: None,
        created_at: published,
        updated_at: None,
        published_at: Some(published),
    };
    let saved_at = Utc::now();
    let snapshot = BookmarkEntry::from_article(&article, saved_at);

    assert_eq!(snapshot.id, "42");
    assert_eq!(snapshot.slug, "ownership-in-practice");
    assert_eq!(snapshot.read_time, 7);
    assert_eq!(snapshot.published_at, Some(published));
    assert_eq!(snapshot.saved_at, saved_at);
}

#[test]
fn test_outcome_messages_are_user_facing() {
    assert_eq!(AddOutcome::Added.message(), "Article saved to your reading list");
    assert_eq!(RemoveOutcome::NotSaved.message(), "Article was not in your reading list");
    assert_eq!(ToggleOutcome::Removed.message(), RemoveOutcome::Removed.message());
}
