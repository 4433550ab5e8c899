use thiserror::Error;

// === StorageError ===

/// Errors raised by the device-local key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The SQLite file could not be opened or migrated.
    #[error("Storage open failed: {0}")]
    OpenFailed(String),
    /// A query against the store failed.
    #[error("Storage database error: {0}")]
    DatabaseError(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::DatabaseError(e.to_string())
    }
}

// === BookmarkError ===

/// Errors related to reading-list operations.
///
/// Capacity and duplicates are not errors; they are reported through the
/// outcome enums in `managers::bookmark_manager`.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// Persisting or loading the list failed.
    #[error("Bookmark storage error: {0}")]
    Storage(#[from] StorageError),
    /// Failed to serialize the list for persistence.
    #[error("Bookmark serialization error: {0}")]
    SerializationError(String),
}

// === ValidationError ===

/// Input rejected before it reaches the backend.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field was empty.
    #[error("Missing required field: {0}")]
    Required(&'static str),
    /// A field exceeded its maximum length.
    #[error("Field too long: {field} (max {max} characters)")]
    TooLong { field: &'static str, max: usize },
    /// The email address is malformed.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),
    /// A reply referenced a comment on a different article.
    #[error("Invalid parent comment: {0}")]
    InvalidParent(String),
}

// === BackendError ===

/// Errors from the hosted backend's REST/RPC surface.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never produced a response.
    #[error("Backend network error: {0}")]
    NetworkError(String),
    /// The backend rejected the credentials carried by the request.
    #[error("Backend unauthorized: {0}")]
    Unauthorized(String),
    /// No row matched, or the endpoint does not exist.
    #[error("Backend resource not found: {0}")]
    NotFound(String),
    /// A unique or foreign-key constraint was violated.
    #[error("Backend conflict: {0}")]
    Conflict(String),
    /// Any other non-success status.
    #[error("Backend error ({status}): {message}")]
    Http { status: u16, message: String },
    /// The response body did not match the expected shape.
    #[error("Backend decode error: {0}")]
    DecodeError(String),
    /// Input failed local validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A local-storage side effect failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

// === AuthError ===

/// Errors related to the admin console session.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username or password rejected.
    #[error("Invalid admin credentials")]
    InvalidCredentials,
    /// No admin session is stored on this device.
    #[error("Not signed in as admin")]
    NotAuthenticated,
    /// The stored session has passed its expiry.
    #[error("Admin session expired")]
    SessionExpired,
    /// The login call itself failed.
    #[error("Admin auth backend error: {0}")]
    Backend(#[from] BackendError),
    /// Reading or writing the stored session failed.
    #[error("Admin auth storage error: {0}")]
    Storage(#[from] StorageError),
    /// The stored session could not be encoded or decoded.
    #[error("Admin session serialization error: {0}")]
    SerializationError(String),
}

// === SettingsError ===

/// Errors related to site settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
    /// Loading or saving through the backend failed.
    #[error("Settings backend error: {0}")]
    Backend(#[from] BackendError),
}

// === ThemeError ===

/// Errors related to theme preferences.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// The provided color value is invalid.
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    /// The font scale is outside the supported range.
    #[error("Invalid font scale: {0}")]
    InvalidFontScale(f32),
    /// Failed to encode preferences for storage.
    #[error("Theme serialization error: {0}")]
    SerializationError(String),
    /// Persisting preferences failed.
    #[error("Theme storage error: {0}")]
    Storage(#[from] StorageError),
}

// === ConfigError ===

/// Errors related to loading the client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Config I/O error: {0}")]
    IoError(String),
    /// The config file is not valid JSON for `ClientConfig`.
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// An environment override has an unusable value.
    #[error("Invalid config value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
