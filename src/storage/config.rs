//! Configuration handling for shelf
//!
//! Configuration is stored in `~/.config/shelf/config.toml` (or the platform
//! equivalent) and can be pointed elsewhere with `--config`. Every key is
//! optional.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Output format preference
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FormatPreference {
    #[default]
    Text,
    Json,
}

/// Locations of the data files
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DataConfig {
    /// Book records file
    pub books_file: Option<PathBuf>,

    /// User records file
    pub users_file: Option<PathBuf>,
}

/// Behaviour of the interactive menu
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MenuConfig {
    /// Clear the terminal before showing the menu
    pub clear_screen: bool,

    /// Wait for Enter after each action
    pub pause: bool,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            clear_screen: true,
            pause: true,
        }
    }
}

/// Backup settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct BackupConfig {
    /// Copy the data files to `.backup` before every save
    pub on_save: bool,
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Default output format (text or json)
    pub default_format: FormatPreference,

    pub data: DataConfig,

    pub menu: MenuConfig,

    pub backup: BackupConfig,
}

impl Config {
    /// Returns the default config directory
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "shelf", "shelf-cli").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads configuration.
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// and a missing file means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path.to_path_buf()).into());
                }
                Self::load_from(path)
            }
            None => match Self::config_dir() {
                Some(dir) if dir.join("config.toml").is_file() => {
                    Self::load_from(&dir.join("config.toml"))
                }
                _ => Ok(Self::default()),
            },
        }
    }

    /// Loads configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Parses configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config::default();

        assert_eq!(config.default_format, FormatPreference::Text);
        assert_eq!(config.data, DataConfig::default());
        assert!(config.menu.clear_screen);
        assert!(config.menu.pause);
        assert!(!config.backup.on_save);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
default_format = "json"

[data]
books_file = "/srv/library/books.txt"
users_file = "/srv/library/users.txt"

[menu]
clear_screen = false
pause = false

[backup]
on_save = true
"#;

        let config = Config::parse(toml).unwrap();
        assert_eq!(config.default_format, FormatPreference::Json);
        assert_eq!(
            config.data.books_file,
            Some(PathBuf::from("/srv/library/books.txt"))
        );
        assert!(!config.menu.clear_screen);
        assert!(config.backup.on_save);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = Config::parse("[menu]\nclear_screen = false\n").unwrap();

        assert!(!config.menu.clear_screen);
        assert!(config.menu.pause);
        assert!(config.data.users_file.is_none());
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = Config::parse("default_format = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn explicit_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(Some(&dir.path().join("missing.toml")));

        assert!(result.is_err());
    }

    #[test]
    fn load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shelf.toml");
        fs::write(&path, "[backup]\non_save = true\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert!(config.backup.on_save);
    }
}
