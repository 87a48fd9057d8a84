//! Application configuration.
//!
//! Stored as camelCase JSON, by default at `{config_dir}/mkpp3/config.json`:
//!
//! ```json
//! {
//!   "dataPath": "/home/me/cosplay/data",
//!   "profilePath": "/home/me/cosplay/profiles",
//!   "artist": "Jo Photographer",
//!   "copyright": "CC BY-NC 4.0"
//! }
//! ```
//!
//! The data and profile paths are required. There is no sensible default for
//! either, so a missing file is an error rather than an empty config.

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Root of the record store
    pub data_path: PathBuf,
    /// Root sidecars are written under
    pub profile_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    /// Back up and replace existing sidecars (default: true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overwrite: Option<bool>,
}

impl AppConfig {
    pub fn new(data_path: impl Into<PathBuf>, profile_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            profile_path: profile_path.into(),
            artist: None,
            copyright: None,
            overwrite: None,
        }
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite.unwrap_or(true)
    }

    /// `{config_dir}/mkpp3/config.json`
    pub fn default_path() -> Result<PathBuf> {
        let base_dir = dirs::config_dir().context("Failed to determine config directory")?;
        Ok(base_dir.join("mkpp3").join("config.json"))
    }

    /// Load the config at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error naming `path` if it cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load the config from [`AppConfig::default_path`].
    ///
    /// # Errors
    ///
    /// Returns an error if there is no config file there.
    pub fn load_default() -> Result<Self> {
        Self::load(&Self::default_path()?)
    }

    /// Save as pretty JSON, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_camel_case() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"dataPath": "/data", "profilePath": "/profiles", "artist": "Jo"}"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();

        assert_eq!(config.data_path, PathBuf::from("/data"));
        assert_eq!(config.profile_path, PathBuf::from("/profiles"));
        assert_eq!(config.artist.as_deref(), Some("Jo"));
        assert_eq!(config.copyright, None);
        assert!(config.overwrite());
    }

    #[test]
    fn test_save_then_load() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("config.json");
        let mut config = AppConfig::new("/data", "/profiles");
        config.overwrite = Some(false);

        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(!loaded.overwrite());
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"profilePath\""), "{raw}");
    }

    #[test]
    fn test_missing_file_names_path() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("absent.json");
        let err = AppConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("absent.json"), "{err:#}");
    }

    #[test]
    fn test_missing_required_field() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, r#"{"dataPath": "/data"}"#).unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn test_default_path_location() {
        if let Ok(path) = AppConfig::default_path() {
            assert!(path.ends_with("mkpp3/config.json") || path.ends_with("mkpp3\\config.json"));
        }
    }
}
