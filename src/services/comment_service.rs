//! Comments: public reading and submission, threading, admin moderation.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::json;

use crate::services::backend_client::{BackendClient, Query};
use crate::types::comment::{Comment, CommentStatus, CommentThread, NewComment};
use crate::types::errors::{BackendError, ValidationError};

pub const COMMENTS_TABLE: &str = "comments";

pub const MAX_AUTHOR_NAME: usize = 80;
pub const MAX_COMMENT_LEN: usize = 2000;

#[derive(Serialize)]
struct CommentInsert<'a> {
    article_id: &'a str,
    parent_id: Option<&'a str>,
    author_name: &'a str,
    author_email: Option<&'a str>,
    content: &'a str,
    status: CommentStatus,
}

#[derive(Clone)]
pub struct CommentService {
    client: BackendClient,
}

impl CommentService {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    /// Approved comments on `article_id`, oldest first.
    pub async fn list_for_article(&self, article_id: &str) -> Result<Vec<Comment>, BackendError> {
        let query = Query::new()
            .select("*")
            .eq("article_id", article_id)
            .eq("status", CommentStatus::Approved.as_str())
            .order("created_at", true);
        self.client.select(COMMENTS_TABLE, &query).await
    }

    /// Approved comments on `article_id` as reply trees.
    pub async fn threads_for_article(&self, article_id: &str) -> Result<Vec<CommentThread>, BackendError> {
        Ok(build_threads(self.list_for_article(article_id).await?))
    }

    /// Submits a comment for moderation.
    pub async fn submit(&self, comment: &NewComment) -> Result<Comment, BackendError> {
        validate_comment(comment)?;

        if let Some(parent_id) = comment.parent_id.as_deref() {
            let parent: Comment = self
                .client
                .select_one(COMMENTS_TABLE, &Query::new().select("*").eq("id", parent_id))
                .await
                .map_err(|e| match e {
                    BackendError::NotFound(_) => ValidationError::InvalidParent(parent_id.to_string()).into(),
                    other => other,
                })?;
            if parent.article_id != comment.article_id {
                return Err(ValidationError::InvalidParent(parent_id.to_string()).into());
            }
        }

        let row = CommentInsert {
            article_id: &comment.article_id,
            parent_id: comment.parent_id.as_deref(),
            author_name: comment.author_name.trim(),
            author_email: comment
                .author_email
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty()),
            content: comment.content.trim(),
            status: CommentStatus::Pending,
        };
        let stored: Comment = self.client.insert(COMMENTS_TABLE, &row).await?;
        tracing::info!(comment_id = %stored.id, "comment submitted for moderation");
        Ok(stored)
    }

    /// All comments for the moderation queue, newest first.
    pub async fn list_all(&self, status: Option<CommentStatus>) -> Result<Vec<Comment>, BackendError> {
        let mut query = Query::new().select("*");
        if let Some(status) = status {
            query = query.eq("status", status.as_str());
        }
        self.client
            .select(COMMENTS_TABLE, &query.order("created_at", false))
            .await
    }

    async fn set_status(&self, id: &str, status: CommentStatus) -> Result<Comment, BackendError> {
        let rows: Vec<Comment> = self
            .client
            .update(
                COMMENTS_TABLE,
                &Query::new().eq("id", id),
                &json!({ "status": status.as_str() }),
            )
            .await?;
        let comment = rows
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("comment '{}'", id)))?;
        tracing::info!(comment_id = %id, status = status.as_str(), "comment moderated");
        Ok(comment)
    }

    pub async fn approve(&self, id: &str) -> Result<Comment, BackendError> {
        self.set_status(id, CommentStatus::Approved).await
    }

    pub async fn reject(&self, id: &str) -> Result<Comment, BackendError> {
        self.set_status(id, CommentStatus::Rejected).await
    }

    /// Deletes a comment and its direct replies.
    pub async fn delete(&self, id: &str) -> Result<(), BackendError> {
        self.client
            .delete(COMMENTS_TABLE, &Query::new().eq("parent_id", id))
            .await?;
        self.client
            .delete(COMMENTS_TABLE, &Query::new().eq("id", id))
            .await
    }

    pub async fn pending_count(&self) -> Result<u64, BackendError> {
        self.client
            .count(
                COMMENTS_TABLE,
                &Query::new().eq("status", CommentStatus::Pending.as_str()),
            )
            .await
    }
}

/// Checks a public submission before it is sent.
pub fn validate_comment(comment: &NewComment) -> Result<(), ValidationError> {
    let name = comment.author_name.trim();
    if name.is_empty() {
        return Err(ValidationError::Required("author_name"));
    }
    if name.chars().count() > MAX_AUTHOR_NAME {
        return Err(ValidationError::TooLong {
            field: "author_name",
            max: MAX_AUTHOR_NAME,
        });
    }

    let content = comment.content.trim();
    if content.is_empty() {
        return Err(ValidationError::Required("content"));
    }
    if content.chars().count() > MAX_COMMENT_LEN {
        return Err(ValidationError::TooLong {
            field: "content",
            max: MAX_COMMENT_LEN,
        });
    }

    if let Some(email) = comment.author_email.as_deref().map(str::trim) {
        if !email.is_empty() && !is_plausible_email(email) {
            return Err(ValidationError::InvalidEmail(email.to_string()));
        }
    }
    if comment.article_id.trim().is_empty() {
        return Err(ValidationError::Required("article_id"));
    }
    Ok(())
}

/// A single `@` with something on both sides and no whitespace.
pub fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Nests replies under their parents, oldest first at every level.
///
/// A reply whose parent is absent from `comments` becomes a root. Every
/// comment appears exactly once in the result.
pub fn build_threads(mut comments: Vec<Comment>) -> Vec<CommentThread> {
    comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

    let ids: HashSet<String> = comments.iter().map(|c| c.id.clone()).collect();
    let mut children: HashMap<String, Vec<Comment>> = HashMap::new();
    let mut roots: Vec<Comment> = Vec::new();

    for comment in comments {
        match comment.parent_id.as_deref() {
            Some(parent) if parent != comment.id && ids.contains(parent) => {
                children.entry(parent.to_string()).or_default().push(comment);
            }
            _ => roots.push(comment),
        }
    }

    let mut threads: Vec<CommentThread> = roots
        .into_iter()
        .map(|root| attach_replies(root, &mut children))
        .collect();

    // Whatever is left sits on a parent cycle; emit it flat.
    let mut orphaned: Vec<Comment> = children.into_values().flatten().collect();
    orphaned.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    for comment in orphaned {
        threads.push(CommentThread {
            comment,
            replies: Vec::new(),
        });
    }
    threads
}

fn attach_replies(comment: Comment, children: &mut HashMap<String, Vec<Comment>>) -> CommentThread {
    let replies = children
        .remove(&comment.id)
        .unwrap_or_default()
        .into_iter()
        .map(|reply| attach_replies(reply, children))
        .collect();
    CommentThread { comment, replies }
}
