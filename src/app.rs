//! App Core for Quillpost.
//!
//! Central struct holding configuration, local storage, the backend client
//! and the engines that keep in-memory state between calls.

use crate::config::ClientConfig;
use crate::database::local_storage::keys;
use crate::database::{Database, LocalStorage};
use crate::managers::bookmark_manager::BookmarkManager;
use crate::services::admin_auth::AdminSessionStore;
use crate::services::article_service::ArticleService;
use crate::services::backend_client::BackendClient;
use crate::services::comment_service::CommentService;
use crate::services::contact_service::ContactService;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::theme_engine::ThemeEngine;
use crate::types::errors::{AuthError, BackendError, StorageError};
use crate::types::settings::ThemePreferences;

/// Central application struct.
///
/// `BookmarkManager` and `AdminSessionStore` borrow the connection, so they
/// are created on demand through [`App::bookmarks`] and [`App::sessions`].
pub struct App {
    pub config: ClientConfig,
    pub db: Database,
    pub backend: BackendClient,
    pub settings_engine: SettingsEngine,
    pub theme_engine: ThemeEngine,
}

impl App {
    /// Opens local storage at the configured path and builds the client.
    pub fn new(config: ClientConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Database::open(config.database_path())?;
        Ok(Self::with_database(config, db)?)
    }

    /// Builds the app around an already-open database.
    pub fn with_database(config: ClientConfig, db: Database) -> Result<Self, BackendError> {
        let backend = BackendClient::from_config(&config)?;
        let theme_engine = ThemeEngine::load(&LocalStorage::new(db.connection()), ThemePreferences::default());
        Ok(Self {
            config,
            db,
            backend,
            settings_engine: SettingsEngine::new(),
            theme_engine,
        })
    }

    /// Startup sequence: fetch site settings and seed the theme from them
    /// when the reader has no stored preferences.
    ///
    /// Failures are logged; the app keeps running on defaults.
    pub async fn startup(&mut self) {
        if let Err(e) = self.settings_engine.load(&self.backend).await {
            tracing::warn!(%e, "could not load site settings, using defaults");
        }

        let has_prefs = match self.storage().get(keys::THEME_PREFERENCES) {
            Ok(stored) => stored.is_some(),
            Err(e) => {
                tracing::warn!(%e, "failed to read theme preferences");
                false
            }
        };
        if !has_prefs {
            self.theme_engine = ThemeEngine::from_site_defaults(&self.settings_engine.get_settings().appearance);
        }
    }

    pub fn storage(&self) -> LocalStorage<'_> {
        LocalStorage::new(self.db.connection())
    }

    pub fn bookmarks(&self) -> BookmarkManager<'_> {
        BookmarkManager::new(self.db.connection())
    }

    pub fn sessions(&self) -> AdminSessionStore<'_> {
        AdminSessionStore::new(self.storage())
    }

    pub fn articles(&self) -> ArticleService {
        ArticleService::new(self.backend.clone())
    }

    pub fn comments(&self) -> CommentService {
        CommentService::new(self.backend.clone())
    }

    pub fn contact(&self) -> ContactService {
        ContactService::new(self.backend.clone())
    }

    /// Backend client authorized with the current admin session.
    pub fn admin_client(&self, now: i64) -> Result<BackendClient, AuthError> {
        let session = self.sessions().require(now)?;
        Ok(self.backend.with_access_token(&session.access_token))
    }

    /// Site theme defaults as reader preferences.
    pub fn default_theme_preferences(&self) -> ThemePreferences {
        let appearance = &self.settings_engine.get_settings().appearance;
        ThemePreferences {
            mode: appearance.theme,
            accent_color: appearance.accent_color.clone(),
            ..ThemePreferences::default()
        }
    }

    /// Wipes every device-local record: reading list, preferences, session.
    pub fn clear_local_data(&mut self) -> Result<(), StorageError> {
        self.storage().clear()?;
        self.theme_engine = ThemeEngine::new(self.default_theme_preferences());
        tracing::info!("local data cleared");
        Ok(())
    }
}
