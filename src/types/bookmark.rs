use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::article::Article;

/// A saved article snapshot in the reading list.
///
/// Captured when the user saves the article; later edits to the article on
/// the backend are not reflected here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookmarkEntry {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub read_time: u32,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub saved_at: DateTime<Utc>,
}

impl BookmarkEntry {
    /// Snapshots `article` as of `saved_at`.
    pub fn from_article(article: &Article, saved_at: DateTime<Utc>) -> Self {
        Self {
            id: article.id.clone(),
            title: article.title.clone(),
            slug: article.slug.clone(),
            excerpt: article.excerpt.clone(),
            cover_image: article.cover_image.clone(),
            category: article.category.clone(),
            read_time: article.read_time,
            view_count: article.view_count,
            published_at: article.published_at,
            saved_at,
        }
    }
}
