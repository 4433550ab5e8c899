use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row of the backend `contact_messages` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Contact form submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
}
