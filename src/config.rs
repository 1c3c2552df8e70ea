//! Application config
//!
//! Read from `<config dir>/technews/config.yaml`. Every field is optional;
//! `TECHNEWS_API_KEY` takes precedence over the file's `api_key`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    API_KEY_ENV, APP_DIR_NAME, CONFIG_FILE, DEFAULT_BASE_URL, DEFAULT_LANGUAGE, DEFAULT_LOG_FILE,
    DEFAULT_PAGE_SIZE,
};
use crate::error::ConfigError;
use crate::storage;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub language: String,
    pub page_size: u32,
    pub log_file: PathBuf,
    /// Overrides the preference file location
    pub preferences_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            preferences_path: None,
        }
    }
}

impl AppConfig {
    /// Load from the default location, falling back to defaults when the
    /// file does not exist
    pub fn load() -> Result<Self, ConfigError> {
        let config = match default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.with_env_key(std::env::var(API_KEY_ENV).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Apply an API key taken from the environment and validate the result
    pub fn with_env_key(mut self, env_key: Option<String>) -> Result<Self, ConfigError> {
        if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".to_string()));
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url must not be empty".to_string()));
        }
        Ok(self)
    }

    /// Where the theme preference lives
    pub fn preferences_path(&self) -> Option<PathBuf> {
        self.preferences_path.clone().or_else(storage::default_path)
    }
}

/// `<config dir>/technews/config.yaml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE))
}
