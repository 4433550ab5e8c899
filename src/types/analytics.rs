use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_articles: usize,
    pub published_articles: usize,
    pub draft_articles: usize,
    pub total_views: i64,
    pub total_likes: i64,
    pub total_comments: usize,
    pub pending_comments: usize,
}

/// One bar of the "top articles" chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopArticle {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub view_count: i64,
    pub like_count: i64,
}

/// Per-category slice of the category chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryStats {
    pub category: String,
    pub articles: usize,
    pub views: i64,
}

/// One point of the daily views series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyViews {
    pub date: NaiveDate,
    pub views: u64,
}

/// A row of the backend `article_views` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewEvent {
    pub article_id: String,
    pub viewed_at: DateTime<Utc>,
}

/// Everything the analytics page renders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsReport {
    pub stats: DashboardStats,
    pub top_articles: Vec<TopArticle>,
    pub categories: Vec<CategoryStats>,
    pub daily_views: Vec<DailyViews>,
}
