//! Admin article management.
//!
//! Every request carries the admin session's access token.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::services::article_service::ARTICLES_TABLE;
use crate::services::backend_client::{BackendClient, Query};
use crate::services::formatting::{estimate_read_time, make_excerpt, slugify};
use crate::types::admin::AdminSession;
use crate::types::article::{Article, ArticleDraft, ArticleStatus};
use crate::types::errors::{BackendError, ValidationError};

pub const MAX_TITLE_LEN: usize = 200;
pub const EXCERPT_LEN: usize = 160;

/// Row written to `articles` on create and update.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ArticlePayload {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub status: ArticleStatus,
    pub read_time: u32,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Validates `draft` and fills in the derived fields.
///
/// `existing` is the stored article on update; its first `published_at` is kept.
pub fn prepare_draft(
    draft: &ArticleDraft,
    existing: Option<&Article>,
    now: DateTime<Utc>,
) -> Result<ArticlePayload, ValidationError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(ValidationError::Required("title"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TooLong {
            field: "title",
            max: MAX_TITLE_LEN,
        });
    }
    if draft.content.trim().is_empty() {
        return Err(ValidationError::Required("content"));
    }

    let slug = match draft.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(custom) => slugify(custom),
        None => slugify(title),
    };
    let excerpt = match draft.excerpt.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(custom) => custom.to_string(),
        None => make_excerpt(&draft.content, EXCERPT_LEN),
    };

    let mut tags: Vec<String> = Vec::new();
    for tag in draft.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            tags.push(tag.to_string());
        }
    }

    let published_at = match draft.status {
        ArticleStatus::Published => existing.and_then(|a| a.published_at).or(Some(now)),
        ArticleStatus::Draft => existing.and_then(|a| a.published_at),
    };

    Ok(ArticlePayload {
        title: title.to_string(),
        slug,
        excerpt,
        content: draft.content.clone(),
        cover_image: clean(&draft.cover_image),
        category: clean(&draft.category),
        tags,
        status: draft.status,
        read_time: estimate_read_time(&draft.content),
        author: clean(&draft.author),
        published_at,
        updated_at: now,
    })
}

fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Article CRUD for a signed-in admin.
pub struct AdminConsole {
    client: BackendClient,
}

impl AdminConsole {
    pub fn new(client: &BackendClient, session: &AdminSession) -> Self {
        Self {
            client: client.with_access_token(&session.access_token),
        }
    }

    /// Every article including drafts, newest first.
    pub async fn list_all(&self) -> Result<Vec<Article>, BackendError> {
        self.client
            .select(ARTICLES_TABLE, &Query::new().select("*").order("created_at", false))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Article, BackendError> {
        self.client
            .select_one(ARTICLES_TABLE, &Query::new().select("*").eq("id", id))
            .await
            .map_err(|e| match e {
                BackendError::NotFound(_) => BackendError::NotFound(format!("article '{}'", id)),
                other => other,
            })
    }

    pub async fn create(&self, draft: &ArticleDraft) -> Result<Article, BackendError> {
        let payload = prepare_draft(draft, None, Utc::now())?;
        let article: Article = self.client.insert(ARTICLES_TABLE, &payload).await?;
        tracing::info!(article_id = %article.id, slug = %article.slug, "article created");
        Ok(article)
    }

    pub async fn update(&self, id: &str, draft: &ArticleDraft) -> Result<Article, BackendError> {
        let existing = self.get(id).await?;
        let payload = prepare_draft(draft, Some(&existing), Utc::now())?;
        let rows: Vec<Article> = self
            .client
            .update(ARTICLES_TABLE, &Query::new().eq("id", id), &payload)
            .await?;
        let article = rows
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("article '{}'", id)))?;
        tracing::info!(article_id = %id, "article updated");
        Ok(article)
    }

    /// Publishes or unpublishes without touching the content.
    pub async fn set_status(&self, id: &str, status: ArticleStatus) -> Result<Article, BackendError> {
        let existing = self.get(id).await?;
        let now = Utc::now();
        let published_at = match status {
            ArticleStatus::Published => existing.published_at.or(Some(now)),
            ArticleStatus::Draft => existing.published_at,
        };
        let rows: Vec<Article> = self
            .client
            .update(
                ARTICLES_TABLE,
                &Query::new().eq("id", id),
                &json!({ "status": status, "published_at": published_at, "updated_at": now }),
            )
            .await?;
        let article = rows
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("article '{}'", id)))?;
        tracing::info!(article_id = %id, status = status.as_str(), "article status changed");
        Ok(article)
    }

    pub async fn delete(&self, id: &str) -> Result<(), BackendError> {
        self.client
            .delete(ARTICLES_TABLE, &Query::new().eq("id", id))
            .await?;
        tracing::info!(article_id = %id, "article deleted");
        Ok(())
    }

    /// The underlying authorized client, for moderation and analytics calls.
    pub fn client(&self) -> &BackendClient {
        &self.client
    }
}
