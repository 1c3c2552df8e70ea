use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::watch;

use crate::constants::{APP_DIR_NAME, PREFERENCES_FILE};
use crate::error::StorageError;

/// On-disk layout of the preference file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct Preferences {
    /// Stored under `is_dark_theme`
    #[serde(default)]
    is_dark_theme: bool,
}

/// Persisted key-value preferences with an observable theme flag
pub struct PreferenceStore {
    path: PathBuf,
    dark_theme: watch::Sender<bool>,
}

impl PreferenceStore {
    /// Open the store backed by `path`. A missing file means defaults; an
    /// unreadable one is logged and treated the same way.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let prefs = match fs::read_to_string(&path).await {
            Ok(content) => serde_yaml::from_str::<Preferences>(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt preferences");
                Preferences::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Preferences::default(),
            Err(e) => return Err(e.into()),
        };

        Ok(PreferenceStore {
            path,
            dark_theme: watch::Sender::new(prefs.is_dark_theme),
        })
    }

    /// Observe the dark theme flag; the current value is available at once
    pub fn dark_theme(&self) -> watch::Receiver<bool> {
        self.dark_theme.subscribe()
    }

    pub fn is_dark_theme(&self) -> bool {
        *self.dark_theme.borrow()
    }

    /// Persist the flag, then notify observers
    pub async fn set_dark_theme(&self, value: bool) -> Result<(), StorageError> {
        let prefs = Preferences {
            is_dark_theme: value,
        };
        self.save(&prefs).await?;
        tracing::info!(dark_theme = value, "Theme preference saved");
        self.dark_theme.send_replace(value);
        Ok(())
    }

    /// Flip the flag and return the new value
    pub async fn toggle_dark_theme(&self) -> Result<bool, StorageError> {
        let value = !self.is_dark_theme();
        self.set_dark_theme(value).await?;
        Ok(value)
    }

    /// Write through a temp file so a crash never leaves a torn file
    async fn save(&self, prefs: &Preferences) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).await?;
        }
        let content = serde_yaml::to_string(prefs)?;
        let tmp = self.path.with_extension("yaml.tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// `<config dir>/technews/theme_preferences.yaml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(PREFERENCES_FILE))
}
