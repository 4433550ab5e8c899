//! Public article reads, likes and view counting.

use std::collections::BTreeMap;

use serde_json::json;

use crate::services::backend_client::{BackendClient, Query};
use crate::types::article::{Article, CategoryCount, LikeState};
use crate::types::errors::BackendError;

pub const ARTICLES_TABLE: &str = "articles";
pub const LIKES_TABLE: &str = "article_likes";

/// Reader-facing article operations.
#[derive(Clone)]
pub struct ArticleService {
    client: BackendClient,
}

impl ArticleService {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    fn published() -> Query {
        Query::new()
            .select("*")
            .eq("status", "published")
            .order("published_at", false)
    }

    /// All published articles, newest first.
    pub async fn list_published(&self) -> Result<Vec<Article>, BackendError> {
        self.client.select(ARTICLES_TABLE, &Self::published()).await
    }

    /// The `limit` most recent published articles, for the home page.
    pub async fn featured(&self, limit: usize) -> Result<Vec<Article>, BackendError> {
        self.client
            .select(ARTICLES_TABLE, &Self::published().limit(limit))
            .await
    }

    /// A published article by slug.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Article, BackendError> {
        self.client
            .select_one(ARTICLES_TABLE, &Self::published().eq("slug", slug))
            .await
            .map_err(|e| match e {
                BackendError::NotFound(_) => BackendError::NotFound(format!("article '{}'", slug)),
                other => other,
            })
    }

    /// Up to `limit` other articles, same category first.
    pub async fn related(&self, article: &Article, limit: usize) -> Result<Vec<Article>, BackendError> {
        let all = self.list_published().await?;
        Ok(pick_related(&all, article, limit))
    }

    pub async fn categories(&self) -> Result<Vec<CategoryCount>, BackendError> {
        let all = self.list_published().await?;
        Ok(count_categories(&all))
    }

    /// Bumps the server-side view counter.
    pub async fn record_view(&self, article_id: &str) -> Result<(), BackendError> {
        self.client
            .rpc_unit("increment_article_views", &json!({ "p_article_id": article_id }))
            .await
    }

    /// Likes or unlikes on behalf of `visitor_id`.
    pub async fn toggle_like(&self, article_id: &str, visitor_id: &str) -> Result<LikeState, BackendError> {
        let state: LikeState = self
            .client
            .rpc(
                "toggle_article_like",
                &json!({ "p_article_id": article_id, "p_visitor_id": visitor_id }),
            )
            .await?;
        tracing::info!(%article_id, liked = state.liked, "like toggled");
        Ok(state)
    }

    pub async fn has_liked(&self, article_id: &str, visitor_id: &str) -> Result<bool, BackendError> {
        let query = Query::new()
            .eq("article_id", article_id)
            .eq("visitor_id", visitor_id);
        Ok(self.client.count(LIKES_TABLE, &query).await? > 0)
    }
}

/// Same-category articles first (in input order), then the rest.
/// Never includes `article` itself or unpublished articles.
pub fn pick_related(all: &[Article], article: &Article, limit: usize) -> Vec<Article> {
    let candidates = all
        .iter()
        .filter(|a| a.id != article.id && a.is_published());

    let (same, other): (Vec<&Article>, Vec<&Article>) = candidates.partition(|a| {
        article.category.is_some()
            && a.category
                .as_deref()
                .zip(article.category.as_deref())
                .is_some_and(|(x, y)| x.eq_ignore_ascii_case(y))
    });

    same.into_iter()
        .chain(other)
        .take(limit)
        .cloned()
        .collect()
}

/// Distinct categories with article counts, sorted by name.
pub fn count_categories(articles: &[Article]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for category in articles.iter().filter_map(|a| a.category.as_deref()) {
        let name = category.trim();
        if !name.is_empty() {
            *counts.entry(name.to_string()).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(name, count)| CategoryCount { name, count })
        .collect()
}
