//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Default news API host
pub const DEFAULT_BASE_URL: &str = "https://newsapi.org";

/// Path of the full-text search endpoint
pub const EVERYTHING_PATH: &str = "v2/everything";

/// Path of the top headlines endpoint
pub const TOP_HEADLINES_PATH: &str = "v2/top-headlines";

/// Articles requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Language filter sent with every request
pub const DEFAULT_LANGUAGE: &str = "en";

/// First value of the pagination cursor
pub const FIRST_PAGE: u32 = 1;

/// Message used when a failure carries no text of its own
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred";

/// Directory name under the platform config dir
pub const APP_DIR_NAME: &str = "technews";

/// Preference file holding the theme flag
pub const PREFERENCES_FILE: &str = "theme_preferences.yaml";

/// Preference key of the dark theme flag
pub const DARK_THEME_KEY: &str = "is_dark_theme";

/// Config file name
pub const CONFIG_FILE: &str = "config.yaml";

/// Environment variable overriding the configured API key
pub const API_KEY_ENV: &str = "TECHNEWS_API_KEY";

/// Default log file
pub const DEFAULT_LOG_FILE: &str = "technews.log";

/// User agent sent to the news API
pub const USER_AGENT: &str = concat!("technews/", env!("CARGO_PKG_VERSION"));
