use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Moderation state of a comment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Pending => "pending",
            CommentStatus::Approved => "approved",
            CommentStatus::Rejected => "rejected",
        }
    }
}

/// A row of the backend `comments` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: String,
    pub article_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub author_name: String,
    #[serde(default)]
    pub author_email: Option<String>,
    pub content: String,
    #[serde(default)]
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
}

/// A comment submitted from the article page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewComment {
    pub article_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub author_name: String,
    #[serde(default)]
    pub author_email: Option<String>,
    pub content: String,
}

/// A comment together with its replies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<CommentThread>,
}

impl CommentThread {
    /// Number of comments in this thread, the root included.
    pub fn total_comments(&self) -> usize {
        1 + self
            .replies
            .iter()
            .map(CommentThread::total_comments)
            .sum::<usize>()
    }
}
