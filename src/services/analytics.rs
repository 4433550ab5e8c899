//! Admin analytics: totals, top articles, categories and daily views.
//!
//! Aggregation happens client-side over the fetched rows; the result sets
//! are small enough for that.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;

use crate::services::article_service::ARTICLES_TABLE;
use crate::services::backend_client::{BackendClient, Query};
use crate::services::comment_service::COMMENTS_TABLE;
use crate::types::analytics::{
    AnalyticsReport, CategoryStats, DailyViews, DashboardStats, TopArticle, ViewEvent,
};
use crate::types::article::Article;
use crate::types::comment::CommentStatus;
use crate::types::errors::BackendError;

pub const VIEWS_TABLE: &str = "article_views";

/// Longest window a report covers; larger requests are cut to this.
pub const MAX_REPORT_DAYS: u32 = 365;

/// Label for articles without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Deserialize)]
struct CommentStatusRow {
    status: CommentStatus,
}

pub struct AnalyticsService {
    client: BackendClient,
}

impl AnalyticsService {
    /// `client` must carry the admin access token.
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    /// Fetches everything and builds the report for the last `days` days.
    pub async fn report(&self, days: u32, top_n: usize) -> Result<AnalyticsReport, BackendError> {
        let articles: Vec<Article> = self
            .client
            .select(ARTICLES_TABLE, &Query::new().select("*"))
            .await?;
        let statuses: Vec<CommentStatusRow> = self
            .client
            .select(COMMENTS_TABLE, &Query::new().select("status"))
            .await?;

        let days = report_window(days);
        let today = Utc::now().date_naive();
        let since = today - Duration::days(i64::from(days) - 1);
        let since_ts = since.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        let views: Vec<ViewEvent> = self
            .client
            .select(
                VIEWS_TABLE,
                &Query::new()
                    .select("article_id,viewed_at")
                    .gte("viewed_at", since_ts.to_rfc3339()),
            )
            .await?;

        let comment_statuses: Vec<CommentStatus> = statuses.into_iter().map(|r| r.status).collect();
        Ok(AnalyticsReport {
            stats: dashboard_stats(&articles, &comment_statuses),
            top_articles: top_articles(&articles, top_n),
            categories: category_stats(&articles),
            daily_views: daily_views(&views, today, days),
        })
    }
}

pub fn dashboard_stats(articles: &[Article], comments: &[CommentStatus]) -> DashboardStats {
    let published_articles = articles.iter().filter(|a| a.is_published()).count();
    DashboardStats {
        total_articles: articles.len(),
        published_articles,
        draft_articles: articles.len() - published_articles,
        total_views: articles.iter().map(|a| a.view_count).sum(),
        total_likes: articles.iter().map(|a| a.like_count).sum(),
        total_comments: comments.len(),
        pending_comments: comments
            .iter()
            .filter(|s| **s == CommentStatus::Pending)
            .count(),
    }
}

/// The `n` most viewed articles; ties broken by likes, then title.
pub fn top_articles(articles: &[Article], n: usize) -> Vec<TopArticle> {
    let mut sorted: Vec<&Article> = articles.iter().collect();
    sorted.sort_by(|a, b| {
        b.view_count
            .cmp(&a.view_count)
            .then_with(|| b.like_count.cmp(&a.like_count))
            .then_with(|| a.title.cmp(&b.title))
    });
    sorted
        .into_iter()
        .take(n)
        .map(|a| TopArticle {
            id: a.id.clone(),
            title: a.title.clone(),
            slug: a.slug.clone(),
            view_count: a.view_count,
            like_count: a.like_count,
        })
        .collect()
}

/// Per-category counts, most viewed first.
pub fn category_stats(articles: &[Article]) -> Vec<CategoryStats> {
    let mut by_category: BTreeMap<String, (usize, i64)> = BTreeMap::new();
    for article in articles {
        let name = article
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED);
        let slot = by_category.entry(name.to_string()).or_default();
        slot.0 += 1;
        slot.1 += article.view_count;
    }

    let mut stats: Vec<CategoryStats> = by_category
        .into_iter()
        .map(|(category, (articles, views))| CategoryStats {
            category,
            articles,
            views,
        })
        .collect();
    stats.sort_by(|a, b| b.views.cmp(&a.views).then_with(|| a.category.cmp(&b.category)));
    stats
}

/// Clamps a requested window to `1..=MAX_REPORT_DAYS`.
pub fn report_window(days: u32) -> u32 {
    days.clamp(1, MAX_REPORT_DAYS)
}

/// Views per day for the `days` days ending at `today`, oldest first, zero-filled.
pub fn daily_views(events: &[ViewEvent], today: NaiveDate, days: u32) -> Vec<DailyViews> {
    let days = report_window(days);
    let first = today - Duration::days(i64::from(days) - 1);

    let mut buckets: BTreeMap<NaiveDate, u64> = (0..days)
        .map(|offset| (first + Duration::days(i64::from(offset)), 0))
        .collect();
    for event in events {
        if let Some(count) = buckets.get_mut(&event.viewed_at.date_naive()) {
            *count += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(date, views)| DailyViews { date, views })
        .collect()
}
