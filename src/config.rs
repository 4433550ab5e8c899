//! Client configuration.
//!
//! Read from `config.json` in the platform config directory, then overridden
//! by `QUILLPOST_*` environment variables. A missing file means defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::errors::ConfigError;

pub const ENV_BACKEND_URL: &str = "QUILLPOST_BACKEND_URL";
pub const ENV_ANON_KEY: &str = "QUILLPOST_ANON_KEY";
pub const ENV_DATA_DIR: &str = "QUILLPOST_DATA_DIR";
pub const ENV_TIMEOUT_SECS: &str = "QUILLPOST_TIMEOUT_SECS";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Project URL of the hosted backend, e.g. `https://abc.example.co`.
    pub backend_url: String,
    /// Published anonymous key sent with every request.
    pub anon_key: String,
    /// Where the local storage database lives.
    pub data_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub page_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:54321".to_string(),
            anon_key: String::new(),
            data_dir: default_data_dir(),
            request_timeout_secs: 15,
            page_size: 9,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quillpost")
}

impl ClientConfig {
    /// Default location of `config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("quillpost").join("config.json"))
    }

    /// Loads the config file at the default path and applies env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::default_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Reads `path`; a missing file yields defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
    }

    /// Applies overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BACKEND_URL) {
            self.backend_url = url;
        }
        if let Some(key) = lookup(ENV_ANON_KEY) {
            self.anon_key = key;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.request_timeout_secs = raw
                .trim()
                .parse()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: ENV_TIMEOUT_SECS.to_string(),
                    value: raw.clone(),
                })?;
        }
        self.backend_url = self.backend_url.trim_end_matches('/').to_string();
        Ok(())
    }

    /// Path of the local storage database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("quillpost.db")
    }
}
