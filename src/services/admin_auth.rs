//! Admin console sign-in.
//!
//! The backend verifies credentials through the `admin_login` RPC. The
//! returned session lives in local storage until logout or expiry.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::database::local_storage::{keys, LocalStorage};
use crate::services::backend_client::BackendClient;
use crate::types::admin::AdminSession;
use crate::types::errors::AuthError;

/// Session lifetime used when the backend does not say.
pub const DEFAULT_SESSION_SECS: i64 = 24 * 60 * 60;

#[derive(Serialize)]
struct LoginArgs<'a> {
    p_username: &'a str,
    p_password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    admin_id: String,
    username: String,
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Verifies credentials and returns a fresh session.
///
/// The password buffer is wiped when the call returns.
pub async fn login(
    client: &BackendClient,
    username: &str,
    password: Zeroizing<String>,
    now: i64,
) -> Result<AdminSession, AuthError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::InvalidCredentials);
    }

    let args = LoginArgs {
        p_username: username,
        p_password: password.as_str(),
    };
    let response: Option<LoginResponse> = client.rpc("admin_login", &args).await?;
    drop(password);
    let Some(response) = response else {
        tracing::warn!(%username, "admin login rejected");
        return Err(AuthError::InvalidCredentials);
    };

    tracing::info!(username = %response.username, "admin signed in");
    Ok(AdminSession {
        admin_id: response.admin_id,
        username: response.username,
        access_token: response.access_token,
        expires_at: now.saturating_add(response.expires_in.unwrap_or(DEFAULT_SESSION_SECS)),
    })
}

/// Persistence for the admin session.
pub struct AdminSessionStore<'a> {
    storage: LocalStorage<'a>,
}

impl<'a> AdminSessionStore<'a> {
    pub fn new(storage: LocalStorage<'a>) -> Self {
        Self { storage }
    }

    pub fn save(&self, session: &AdminSession) -> Result<(), AuthError> {
        let json = Zeroizing::new(
            serde_json::to_string(session).map_err(|e| AuthError::SerializationError(e.to_string()))?,
        );
        self.storage.set(keys::ADMIN_SESSION, &json)?;
        Ok(())
    }

    /// The stored session if present and unexpired at `now`.
    ///
    /// Expired or unreadable sessions are removed.
    pub fn current(&self, now: i64) -> Result<Option<AdminSession>, AuthError> {
        let Some(raw) = self.storage.get(keys::ADMIN_SESSION)?.map(Zeroizing::new) else {
            return Ok(None);
        };
        let session: AdminSession = match serde_json::from_str(&raw) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(%e, "discarding unreadable admin session");
                self.storage.remove(keys::ADMIN_SESSION)?;
                return Ok(None);
            }
        };
        if session.is_expired(now) {
            tracing::info!(username = %session.username, "admin session expired");
            self.storage.remove(keys::ADMIN_SESSION)?;
            return Ok(None);
        }
        Ok(Some(session))
    }

    /// Like [`current`](Self::current) but distinguishes why there is no session.
    pub fn require(&self, now: i64) -> Result<AdminSession, AuthError> {
        let had_record = self.storage.get(keys::ADMIN_SESSION)?.is_some();
        match self.current(now)? {
            Some(session) => Ok(session),
            None if had_record => Err(AuthError::SessionExpired),
            None => Err(AuthError::NotAuthenticated),
        }
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        if self.storage.remove(keys::ADMIN_SESSION)? {
            tracing::info!("admin signed out");
        }
        Ok(())
    }
}
