//! User configuration and preferences

use crate::error::{ArchflashError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct UserConfig {
    /// Whether the welcome dialog has been shown
    pub welcome_shown: bool,
    /// Mode of the most recent session, used to place the selection cursor
    pub last_mode: Option<String>,
}

impl UserConfig {
    /// Get the config file path (~/.config/archflash/config.json)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("archflash").join("config.json"))
    }

    /// Load config from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    fn default_path() -> Result<PathBuf> {
        Self::config_path().ok_or_else(|| {
            ArchflashError::ConfigError("Could not determine config directory".to_string())
        })
    }

    /// Load config from `path`, or the default if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            ArchflashError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            ArchflashError::ConfigError(format!("Failed to parse config file: {}", e))
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ArchflashError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            ArchflashError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, contents).map_err(|e| {
            ArchflashError::ConfigError(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = UserConfig::default();
        assert!(!config.welcome_shown);
        assert!(config.last_mode.is_none());
    }

    #[test]
    fn test_config_path_location() {
        if let Some(path) = UserConfig::config_path() {
            assert!(path.ends_with("archflash/config.json"));
        }
    }

    #[test]
    fn test_older_config_without_last_mode() {
        let config: UserConfig = serde_json::from_str(r#"{"welcome_shown":true}"#).unwrap();
        assert!(config.welcome_shown);
        assert!(config.last_mode.is_none());
    }

    #[test]
    fn test_save_and_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.json");
        let config = UserConfig {
            welcome_shown: true,
            last_mode: Some("g1".to_string()),
        };

        config.save_to(&path).unwrap();
        assert_eq!(UserConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = UserConfig::load_from(&temp_dir.path().join("none.json")).unwrap();
        assert_eq!(loaded, UserConfig::default());
    }

    #[test]
    fn test_load_corrupt_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{{{").unwrap();

        let result = UserConfig::load_from(&path);
        assert!(matches!(result, Err(ArchflashError::ConfigError(_))));
    }
}
