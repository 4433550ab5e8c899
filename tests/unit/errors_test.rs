use quillpost::types::errors::*;

// === StorageError Tests ===

#[test]
fn storage_error_display_variants() {
    assert_eq!(
        StorageError::OpenFailed("no such dir".to_string()).to_string(),
        "Storage open failed: no such dir"
    );
    assert_eq!(
        StorageError::DatabaseError("locked".to_string()).to_string(),
        "Storage database error: locked"
    );
}

#[test]
fn storage_error_from_rusqlite() {
    let err: StorageError = rusqlite::Error::QueryReturnedNoRows.into();
    assert!(matches!(err, StorageError::DatabaseError(_)));
}

// === BookmarkError Tests ===

#[test]
fn bookmark_error_wraps_storage() {
    let err: BookmarkError = StorageError::DatabaseError("disk full".to_string()).into();
    assert_eq!(
        err.to_string(),
        "Bookmark storage error: Storage database error: disk full"
    );
}

// === ValidationError Tests ===

#[test]
fn validation_error_display_variants() {
    assert_eq!(
        ValidationError::Required("author_name").to_string(),
        "Missing required field: author_name"
    );
    assert_eq!(
        ValidationError::TooLong { field: "content", max: 2000 }.to_string(),
        "Field too long: content (max 2000 characters)"
    );
    assert_eq!(
        ValidationError::InvalidEmail("nobody".to_string()).to_string(),
        "Invalid email: nobody"
    );
}

// === BackendError Tests ===

#[test]
fn backend_error_display_variants() {
    assert_eq!(
        BackendError::Http { status: 500, message: "boom".to_string() }.to_string(),
        "Backend error (500): boom"
    );
    assert_eq!(
        BackendError::NotFound("article 'x'".to_string()).to_string(),
        "Backend resource not found: article 'x'"
    );
}

#[test]
fn backend_error_validation_is_transparent() {
    let err: BackendError = ValidationError::Required("title").into();
    assert_eq!(err.to_string(), "Missing required field: title");
}

// === AuthError Tests ===

#[test]
fn auth_error_display_variants() {
    assert_eq!(AuthError::InvalidCredentials.to_string(), "Invalid admin credentials");
    assert_eq!(AuthError::NotAuthenticated.to_string(), "Not signed in as admin");
    assert_eq!(AuthError::SessionExpired.to_string(), "Admin session expired");
}

#[test]
fn auth_error_from_backend() {
    let err: AuthError = BackendError::Unauthorized("bad jwt".to_string()).into();
    assert_eq!(
        err.to_string(),
        "Admin auth backend error: Backend unauthorized: bad jwt"
    );
}

// === SettingsError / ThemeError / ConfigError Tests ===

#[test]
fn settings_error_display_variants() {
    assert_eq!(
        SettingsError::InvalidKey("foo.bar".to_string()).to_string(),
        "Invalid settings key: foo.bar"
    );
    assert_eq!(
        SettingsError::InvalidValue("bad".to_string()).to_string(),
        "Invalid settings value: bad"
    );
}

#[test]
fn theme_error_display_variants() {
    assert_eq!(ThemeError::InvalidColor("red".to_string()).to_string(), "Invalid color: red");
    assert_eq!(ThemeError::InvalidFontScale(3.0).to_string(), "Invalid font scale: 3");
}

#[test]
fn config_error_invalid_value_display() {
    let err = ConfigError::InvalidValue {
        key: "QUILLPOST_TIMEOUT_SECS".to_string(),
        value: "soon".to_string(),
    };
    assert_eq!(err.to_string(), "Invalid config value for QUILLPOST_TIMEOUT_SECS: soon");
}

#[test]
fn errors_implement_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(AuthError::SessionExpired);
    assert!(err.source().is_none());
}
