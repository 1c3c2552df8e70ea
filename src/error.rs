//! Error types
//!
//! Fetch failures surface to the presentation layer only as message text, so
//! `NewsError` displays as the bare message with no prefix.

use thiserror::Error;

use crate::constants::UNKNOWN_ERROR_MESSAGE;

/// Failure of a news API call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NewsError {
    /// No connectivity or another transport-level failure
    #[error("{0}")]
    Network(String),

    /// Non-success HTTP status or a payload that could not be decoded
    #[error("{message}")]
    Api {
        status: Option<u16>,
        message: String,
    },

    /// Failure with no usable description
    #[error("Unknown error occurred")]
    Unknown,
}

impl NewsError {
    /// Text carried by the failure, if any
    pub fn message(&self) -> Option<&str> {
        let text = match self {
            NewsError::Network(message) => message.as_str(),
            NewsError::Api { message, .. } => message.as_str(),
            NewsError::Unknown => return None,
        };
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Message shown to the user, with the generic fallback
    pub fn user_message(&self) -> String {
        self.message().unwrap_or(UNKNOWN_ERROR_MESSAGE).to_string()
    }
}

impl From<reqwest::Error> for NewsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            NewsError::Api {
                status: e.status().map(|s| s.as_u16()),
                message: format!("Invalid response payload: {}", e),
            }
        } else if e.is_timeout() {
            NewsError::Network(format!("Request timed out: {}", e))
        } else if e.is_connect() {
            NewsError::Network(format!("Connection failed: {}", e))
        } else {
            NewsError::Network(e.to_string())
        }
    }
}

/// Failure reading or writing persisted preferences
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),
}

/// Failure loading the application config
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}
