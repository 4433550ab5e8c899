use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Site-wide settings, stored as row `id = 1` of the backend `site_settings` table.
///
/// Columns missing from the row take their default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteSettings {
    pub site_name: String,
    pub tagline: String,
    pub about_content: String,
    pub contact_email: String,
    pub social_links: BTreeMap<String, String>,
    pub posts_per_page: u32,
    pub comments_enabled: bool,
    pub appearance: AppearanceSettings,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "Quillpost".to_string(),
            tagline: "Notes, essays and long reads".to_string(),
            about_content: String::new(),
            contact_email: String::new(),
            social_links: BTreeMap::new(),
            posts_per_page: 9,
            comments_enabled: true,
            appearance: AppearanceSettings::default(),
        }
    }
}

/// Site default appearance, used until a reader picks their own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppearanceSettings {
    pub theme: ThemeMode,
    pub accent_color: String,
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            theme: ThemeMode::System,
            accent_color: "#6366f1".to_string(),
        }
    }
}

/// Theme mode selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Dark,
    Light,
    System,
}

/// Per-device reader preferences, persisted in local storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThemePreferences {
    pub mode: ThemeMode,
    pub accent_color: String,
    #[serde(default = "default_font_scale")]
    pub font_scale: f32,
}

fn default_font_scale() -> f32 {
    1.0
}

impl Default for ThemePreferences {
    fn default() -> Self {
        let appearance = AppearanceSettings::default();
        Self {
            mode: appearance.theme,
            accent_color: appearance.accent_color,
            font_scale: default_font_scale(),
        }
    }
}
