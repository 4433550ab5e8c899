//! Theme Engine: light/dark/system modes, accent colors, font scale and CSS
//! variables for the reader and the admin console.
//!
//! Preferences are per device and live in local storage.

use std::collections::BTreeMap;

use crate::database::local_storage::{keys, LocalStorage};
use crate::types::errors::ThemeError;
use crate::types::settings::{AppearanceSettings, ThemeMode, ThemePreferences};

pub const MIN_FONT_SCALE: f32 = 0.75;
pub const MAX_FONT_SCALE: f32 = 1.5;

/// Named accent colors offered in the appearance picker.
pub const ACCENT_PRESETS: &[(&str, &str)] = &[
    ("indigo", "#6366f1"),
    ("emerald", "#10b981"),
    ("rose", "#f43f5e"),
    ("amber", "#f59e0b"),
    ("sky", "#0ea5e9"),
    ("violet", "#8b5cf6"),
];

/// Trait defining the theme engine interface.
pub trait ThemeEngineTrait {
    fn set_theme(&mut self, mode: ThemeMode);
    fn get_theme(&self) -> ThemeMode;
    fn set_accent_color(&mut self, color: &str) -> Result<(), ThemeError>;
    fn get_accent_color(&self) -> &str;
    fn set_font_scale(&mut self, scale: f32) -> Result<(), ThemeError>;
    fn effective_theme(&self) -> ThemeMode;
    fn get_css_variables(&self) -> BTreeMap<String, String>;
}

struct Palette {
    bg_primary: &'static str,
    bg_secondary: &'static str,
    surface: &'static str,
    text_primary: &'static str,
    text_secondary: &'static str,
    border: &'static str,
    code_bg: &'static str,
}

const DARK: Palette = Palette {
    bg_primary: "#0f172a",
    bg_secondary: "#1e293b",
    surface: "#334155",
    text_primary: "#f1f5f9",
    text_secondary: "#94a3b8",
    border: "#334155",
    code_bg: "#020617",
};

const LIGHT: Palette = Palette {
    bg_primary: "#ffffff",
    bg_secondary: "#f8fafc",
    surface: "#f1f5f9",
    text_primary: "#0f172a",
    text_secondary: "#475569",
    border: "#e2e8f0",
    code_bg: "#f1f5f9",
};

/// Validates a hex color string (e.g. "#6366f1" or "#fff").
pub fn is_valid_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Resolves a preset name or a hex value to a normalized lowercase hex color.
pub fn resolve_accent(input: &str) -> Result<String, ThemeError> {
    let input = input.trim();
    if let Some((_, hex)) = ACCENT_PRESETS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(input))
    {
        return Ok(hex.to_string());
    }
    if is_valid_hex_color(input) {
        Ok(input.to_ascii_lowercase())
    } else {
        Err(ThemeError::InvalidColor(input.to_string()))
    }
}

/// The theme engine implementation.
#[derive(Debug, Clone)]
pub struct ThemeEngine {
    prefs: ThemePreferences,
    system_prefers_dark: bool,
}

impl ThemeEngine {
    pub fn new(prefs: ThemePreferences) -> Self {
        Self {
            prefs,
            system_prefers_dark: false,
        }
    }

    /// Starts from the site's default appearance.
    pub fn from_site_defaults(appearance: &AppearanceSettings) -> Self {
        Self::new(ThemePreferences {
            mode: appearance.theme,
            accent_color: appearance.accent_color.clone(),
            ..ThemePreferences::default()
        })
    }

    /// Loads stored preferences, falling back to `defaults`.
    ///
    /// Unreadable or invalid records are logged and ignored.
    pub fn load(storage: &LocalStorage<'_>, defaults: ThemePreferences) -> Self {
        let stored = match storage.get(keys::THEME_PREFERENCES) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(%e, "failed to read theme preferences");
                None
            }
        };

        let prefs = stored
            .and_then(|raw| match serde_json::from_str::<ThemePreferences>(&raw) {
                Ok(p) if is_valid_hex_color(&p.accent_color) && valid_scale(p.font_scale) => Some(p),
                Ok(_) => {
                    tracing::warn!("ignoring out-of-range theme preferences");
                    None
                }
                Err(e) => {
                    tracing::warn!(%e, "ignoring malformed theme preferences");
                    None
                }
            })
            .unwrap_or(defaults);
        Self::new(prefs)
    }

    pub fn save(&self, storage: &LocalStorage<'_>) -> Result<(), ThemeError> {
        let json = serde_json::to_string(&self.prefs)
            .map_err(|e| ThemeError::SerializationError(e.to_string()))?;
        storage.set(keys::THEME_PREFERENCES, &json)?;
        Ok(())
    }

    /// Forgets stored preferences and returns to `defaults`.
    pub fn reset(&mut self, storage: &LocalStorage<'_>, defaults: ThemePreferences) -> Result<(), ThemeError> {
        storage.remove(keys::THEME_PREFERENCES)?;
        self.prefs = defaults;
        Ok(())
    }

    /// Host-reported `prefers-color-scheme`, used for [`ThemeMode::System`].
    pub fn set_system_preference(&mut self, prefers_dark: bool) {
        self.system_prefers_dark = prefers_dark;
    }

    pub fn preferences(&self) -> &ThemePreferences {
        &self.prefs
    }

    fn palette(&self) -> &'static Palette {
        match self.effective_theme() {
            ThemeMode::Dark => &DARK,
            _ => &LIGHT,
        }
    }
}

fn valid_scale(scale: f32) -> bool {
    (MIN_FONT_SCALE..=MAX_FONT_SCALE).contains(&scale)
}

impl ThemeEngineTrait for ThemeEngine {
    fn set_theme(&mut self, mode: ThemeMode) {
        self.prefs.mode = mode;
    }

    fn get_theme(&self) -> ThemeMode {
        self.prefs.mode
    }

    fn set_accent_color(&mut self, color: &str) -> Result<(), ThemeError> {
        self.prefs.accent_color = resolve_accent(color)?;
        Ok(())
    }

    fn get_accent_color(&self) -> &str {
        &self.prefs.accent_color
    }

    fn set_font_scale(&mut self, scale: f32) -> Result<(), ThemeError> {
        if !valid_scale(scale) {
            return Err(ThemeError::InvalidFontScale(scale));
        }
        self.prefs.font_scale = scale;
        Ok(())
    }

    /// The mode actually rendered, with `System` resolved.
    fn effective_theme(&self) -> ThemeMode {
        match self.prefs.mode {
            ThemeMode::System if self.system_prefers_dark => ThemeMode::Dark,
            ThemeMode::System => ThemeMode::Light,
            other => other,
        }
    }

    fn get_css_variables(&self) -> BTreeMap<String, String> {
        let p = self.palette();
        let mut vars = BTreeMap::new();
        vars.insert("--bg-primary".into(), p.bg_primary.into());
        vars.insert("--bg-secondary".into(), p.bg_secondary.into());
        vars.insert("--surface".into(), p.surface.into());
        vars.insert("--text-primary".into(), p.text_primary.into());
        vars.insert("--text-secondary".into(), p.text_secondary.into());
        vars.insert("--border-color".into(), p.border.into());
        vars.insert("--code-bg".into(), p.code_bg.into());
        vars.insert("--accent-color".into(), self.prefs.accent_color.clone());
        vars.insert("--link-color".into(), self.prefs.accent_color.clone());
        vars.insert("--font-scale".into(), format!("{}", self.prefs.font_scale));
        vars.insert(
            "--font-family".into(),
            "Inter, -apple-system, 'Segoe UI', Helvetica, Arial, sans-serif".into(),
        );
        vars.insert("--font-serif".into(), "Georgia, 'Times New Roman', serif".into());
        vars
    }
}
