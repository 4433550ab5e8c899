use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Admin console session, persisted in local storage.
///
/// The access token is wiped from memory when the session is dropped.
#[derive(Clone, Serialize, Deserialize, PartialEq, Zeroize, ZeroizeOnDrop)]
pub struct AdminSession {
    pub admin_id: String,
    pub username: String,
    pub access_token: String,
    /// Unix seconds.
    pub expires_at: i64,
}

impl AdminSession {
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

impl std::fmt::Debug for AdminSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSession")
            .field("admin_id", &self.admin_id)
            .field("username", &self.username)
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
