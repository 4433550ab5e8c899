// Quillpost Settings Engine
// Manages site settings: loading from the backend, editing individual values by
// dot-notation key, saving back (admin only) and resetting to defaults.
// Settings live in row `id = 1` of the `site_settings` table.

use serde::{Deserialize, Serialize};

use crate::services::backend_client::{BackendClient, Query};
use crate::types::errors::{BackendError, SettingsError};
use crate::types::settings::SiteSettings;

pub const SETTINGS_TABLE: &str = "site_settings";
const SETTINGS_ROW_ID: i32 = 1;

/// Top-level keys whose children are free-form.
const OPEN_MAPS: &[&str] = &["social_links"];

#[derive(Serialize, Deserialize)]
struct SettingsRow {
    id: i32,
    #[serde(flatten)]
    settings: SiteSettings,
}

/// Trait defining the in-memory side of the settings engine.
pub trait SettingsEngineTrait {
    fn get_settings(&self) -> &SiteSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn reset(&mut self);
}

/// Settings engine backed by the `site_settings` table.
#[derive(Debug, Clone, Default)]
pub struct SettingsEngine {
    settings: SiteSettings,
}

impl SettingsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches the settings row; a missing row yields defaults.
    pub async fn load(&mut self, client: &BackendClient) -> Result<SiteSettings, SettingsError> {
        let query = Query::new().select("*").eq("id", SETTINGS_ROW_ID);
        match client.select_one::<SettingsRow>(SETTINGS_TABLE, &query).await {
            Ok(row) => self.settings = row.settings,
            Err(BackendError::NotFound(_)) => {
                tracing::info!("no site settings row, using defaults");
                self.settings = SiteSettings::default();
            }
            Err(e) => return Err(e.into()),
        }
        Ok(self.settings.clone())
    }

    /// Upserts the settings row. `client` must carry the admin access token.
    pub async fn save(&mut self, client: &BackendClient) -> Result<(), SettingsError> {
        let row = SettingsRow {
            id: SETTINGS_ROW_ID,
            settings: self.settings.clone(),
        };
        let stored: SettingsRow = client.upsert(SETTINGS_TABLE, &row).await?;
        self.settings = stored.settings;
        tracing::info!("site settings saved");
        Ok(())
    }

}

impl SettingsEngineTrait for SettingsEngine {
    fn get_settings(&self) -> &SiteSettings {
        &self.settings
    }

    /// Updates an individual setting by dot-notation key path.
    ///
    /// The settings are converted to a `serde_json::Value`, the target is
    /// replaced, and the result is deserialized back to validate it.
    ///
    /// # Examples
    /// - `"site_name"` → updates `settings.site_name`
    /// - `"appearance.theme"` → updates `settings.appearance.theme`
    /// - `"social_links.mastodon"` → adds or updates a social link
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        let parts: Vec<&str> = key.split('.').collect();
        if key.is_empty() || parts.iter().any(|p| p.is_empty()) {
            return Err(SettingsError::InvalidKey(format!("Malformed key '{}'", key)));
        }

        let mut json_value = serde_json::to_value(&self.settings)
            .map_err(|e| SettingsError::SerializationError(e.to_string()))?;

        let open_map = parts.len() == 2 && OPEN_MAPS.contains(&parts[0]);
        let (last, path) = parts
            .split_last()
            .ok_or_else(|| SettingsError::InvalidKey(key.to_string()))?;

        let mut current = &mut json_value;
        for part in path {
            current = current
                .get_mut(*part)
                .ok_or_else(|| SettingsError::InvalidKey(format!("Key '{}' not found in settings", key)))?;
        }

        match current {
            serde_json::Value::Object(map) => {
                if !open_map && !map.contains_key(*last) {
                    return Err(SettingsError::InvalidKey(format!(
                        "Key '{}' not found in settings",
                        key
                    )));
                }
                map.insert(last.to_string(), value);
            }
            _ => {
                return Err(SettingsError::InvalidKey(format!(
                    "Cannot navigate to key '{}': intermediate value is not an object",
                    key
                )));
            }
        }

        let new_settings: SiteSettings = serde_json::from_value(json_value).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;
        if new_settings.posts_per_page == 0 {
            return Err(SettingsError::InvalidValue(
                "posts_per_page must be at least 1".to_string(),
            ));
        }

        self.settings = new_settings;
        Ok(())
    }

    fn reset(&mut self) {
        self.settings = SiteSettings::default();
    }
}
