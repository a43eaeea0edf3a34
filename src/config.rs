//! Configuration management
//!
//! Settings live in `config.toml` under the platform config directory. Every
//! field has a default, so partial files load and a missing file is created.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Durable store location
    #[serde(default)]
    pub storage: StorageConfig,
    /// Tutor reply timing
    #[serde(default)]
    pub tutor: TutorConfig,
    /// Local model identity
    #[serde(default)]
    pub model: ModelConfig,
    /// The single local learner
    #[serde(default)]
    pub user: UserConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

fn default_database_path() -> PathBuf {
    data_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("offnet.db")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorConfig {
    /// Lower bound of the simulated thinking time
    #[serde(default = "default_min_delay")]
    pub min_delay_ms: u64,
    /// Upper bound of the simulated thinking time
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

fn default_min_delay() -> u64 {
    500
}

fn default_max_delay() -> u64 {
    1500
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

impl TutorConfig {
    pub fn delay(&self) -> crate::tutor::ResponseDelay {
        crate::tutor::ResponseDelay::from_millis(self.min_delay_ms, self.max_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_name")]
    pub name: String,
    #[serde(default = "default_model_size")]
    pub size: String,
}

fn default_model_name() -> String {
    "DeepSeek-R1".to_string()
}

fn default_model_size() -> String {
    "1.3B".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            size: default_model_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_user_id")]
    pub default_user_id: String,
    #[serde(default = "default_user_name")]
    pub default_name: String,
}

fn default_user_id() -> String {
    "demo-user".to_string()
}

fn default_user_name() -> String {
    "Learner".to_string()
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            default_user_id: default_user_id(),
            default_name: default_user_name(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, writing defaults if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Load configuration from a specific file, writing defaults if absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .context("Failed to read config file")?;
            let config: Config = toml::from_str(&contents)
                .context("Failed to parse config file")?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent()
            .context("Config path has no parent")?;

        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "offnet", "offnet")
        .context("Failed to get project directories")?;
    Ok(base.config_dir().join("config.toml"))
}

/// Get the data directory path
pub fn data_dir() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "offnet", "offnet")
        .context("Failed to get project directories")?;
    Ok(base.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conf").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tutor]\nmax_delay_ms = 10\n\n[model]\nname = \"tiny\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.tutor.min_delay_ms, 500);
        assert_eq!(config.tutor.max_delay_ms, 10);
        assert_eq!(config.model.name, "tiny");
        assert_eq!(config.model.size, "1.3B");
        assert_eq!(config.user.default_user_id, "demo-user");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "tutor = 5").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
