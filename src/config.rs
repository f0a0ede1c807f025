//! Persisted connection settings for the content-graph service.
//!
//! Stored as TOML under the user config directory; `OUTLINE2GRAPH_CONFIG`
//! overrides the location. Values are plain user-edited strings, checked
//! only for non-emptiness at call time.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_GRAPH_URL: &str = "https://yourcommonbase.com";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("no API key configured; set one with `outline2graph config --api-key <KEY>`")]
    MissingApiKey,

    #[error("no service URL configured; set one with `outline2graph config --url <URL>`")]
    MissingUrl,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub graph_url: String,
    pub api_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            graph_url: DEFAULT_GRAPH_URL.to_string(),
            api_key: String::new(),
        }
    }
}

impl Settings {
    /// Loads settings from the default location, falling back to
    /// defaults when no file exists yet.
    pub fn load() -> Result<Self> {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::settings_path()
            .context("Could not determine a settings location for this platform")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write settings: {}", path.display()))
    }

    pub fn settings_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("OUTLINE2GRAPH_CONFIG") {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("com", "outline2graph", "outline2graph")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
    }

    /// Pre-flight check; must pass before any remote call is attempted.
    pub fn require_api_key(&self) -> Result<&str, SettingsError> {
        if self.api_key.trim().is_empty() {
            Err(SettingsError::MissingApiKey)
        } else {
            Ok(&self.api_key)
        }
    }

    pub fn require_graph_url(&self) -> Result<&str, SettingsError> {
        if self.graph_url.trim().is_empty() {
            Err(SettingsError::MissingUrl)
        } else {
            Ok(&self.graph_url)
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn defaults_when_file_is_missing() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&dir.path().join("settings.toml")).unwrap();
        assert_eq!(settings.graph_url, DEFAULT_GRAPH_URL);
        assert!(settings.api_key.is_empty());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let settings = Settings {
            graph_url: "https://graph.example.com".to_string(),
            api_key: "secret".to_string(),
        };
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.graph_url, "https://graph.example.com");
        assert_eq!(loaded.api_key, "secret");
    }

    #[test]
    fn missing_api_key_fails_preflight() {
        let settings = Settings::default();
        assert!(matches!(
            settings.require_api_key(),
            Err(SettingsError::MissingApiKey)
        ));
        assert!(settings.require_graph_url().is_ok());
    }

    #[test]
    fn blank_api_key_fails_preflight() {
        let settings = Settings {
            api_key: "   ".to_string(),
            ..Settings::default()
        };
        assert!(settings.require_api_key().is_err());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let settings: Settings = toml::from_str(r#"api_key = "secret""#).unwrap();
        assert_eq!(settings.graph_url, DEFAULT_GRAPH_URL);
        assert_eq!(settings.api_key, "secret");
    }
}
