use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Publication state of an article.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Draft,
    Published,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
        }
    }
}

/// A row of the backend `articles` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: ArticleStatus,
    #[serde(default)]
    pub read_time: u32,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    pub fn is_published(&self) -> bool {
        self.status == ArticleStatus::Published
    }
}

/// Admin-editable fields of an article, as submitted from the editor form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ArticleDraft {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub content: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: ArticleStatus,
    #[serde(default)]
    pub author: Option<String>,
}

/// Result of the `toggle_article_like` RPC.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LikeState {
    pub liked: bool,
    pub like_count: i64,
}

/// A category and the number of published articles in it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}
