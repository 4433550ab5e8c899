//! Contact form submission and the admin inbox.

use serde_json::json;

use crate::services::backend_client::{BackendClient, Query};
use crate::services::comment_service::is_plausible_email;
use crate::types::contact::{ContactMessage, NewContactMessage};
use crate::types::errors::{BackendError, ValidationError};

pub const CONTACT_TABLE: &str = "contact_messages";

pub const MAX_MESSAGE_LEN: usize = 5000;

#[derive(Clone)]
pub struct ContactService {
    client: BackendClient,
}

impl ContactService {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub async fn submit(&self, message: &NewContactMessage) -> Result<ContactMessage, BackendError> {
        validate_contact(message)?;
        let row = json!({
            "name": message.name.trim(),
            "email": message.email.trim(),
            "subject": message.subject.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            "message": message.message.trim(),
        });
        let stored: ContactMessage = self.client.insert(CONTACT_TABLE, &row).await?;
        tracing::info!(message_id = %stored.id, "contact message sent");
        Ok(stored)
    }

    /// Inbox, newest first.
    pub async fn list(&self) -> Result<Vec<ContactMessage>, BackendError> {
        self.client
            .select(CONTACT_TABLE, &Query::new().select("*").order("created_at", false))
            .await
    }

    pub async fn mark_read(&self, id: &str) -> Result<(), BackendError> {
        let rows: Vec<ContactMessage> = self
            .client
            .update(CONTACT_TABLE, &Query::new().eq("id", id), &json!({ "is_read": true }))
            .await?;
        if rows.is_empty() {
            return Err(BackendError::NotFound(format!("message '{}'", id)));
        }
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), BackendError> {
        self.client
            .delete(CONTACT_TABLE, &Query::new().eq("id", id))
            .await
    }
}

pub fn validate_contact(message: &NewContactMessage) -> Result<(), ValidationError> {
    if message.name.trim().is_empty() {
        return Err(ValidationError::Required("name"));
    }
    let email = message.email.trim();
    if email.is_empty() {
        return Err(ValidationError::Required("email"));
    }
    if !is_plausible_email(email) {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }
    let body = message.message.trim();
    if body.is_empty() {
        return Err(ValidationError::Required("message"));
    }
    if body.chars().count() > MAX_MESSAGE_LEN {
        return Err(ValidationError::TooLong {
            field: "message",
            max: MAX_MESSAGE_LEN,
        });
    }
    Ok(())
}
