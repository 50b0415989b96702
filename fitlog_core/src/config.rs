//! Configuration file support for fitlog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/fitlog/config.toml`.

use crate::{Error, Result, Sex};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DATA_FILE_NAME: &str = "data.json";

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub profile: ProfileConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Older install location, preferred when it exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_file: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            legacy_file: None,
        }
    }
}

impl DataConfig {
    /// The data file to open
    ///
    /// Uses `legacy_file` if it is configured and already exists, so an
    /// existing install keeps its history; otherwise `data_dir/data.json`.
    pub fn resolve_data_file(&self) -> PathBuf {
        match &self.legacy_file {
            Some(legacy) if legacy.exists() => {
                tracing::info!("Using legacy data file {:?}", legacy);
                legacy.clone()
            }
            _ => self.data_dir.join(DATA_FILE_NAME),
        }
    }
}

/// Defaults applied when a measurement omits them
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default)]
    pub sex: Sex,

    /// Height in inches; 0 means not set
    #[serde(default)]
    pub height: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            sex: Sex::Male,
            height: 0.0,
        }
    }
}

fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("fitlog")
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.profile.height.is_finite() || self.profile.height < 0.0 {
            return Err(Error::Config(format!(
                "profile.height must be a non-negative number of inches, got {}",
                self.profile.height
            )));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("fitlog").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.profile.sex, Sex::Male);
        assert_eq!(config.profile.height, 0.0);
        assert!(config.data.legacy_file.is_none());
        assert!(config.data.data_dir.ends_with("fitlog"));
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[profile]
sex = "female"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.profile.sex, Sex::Female);
        assert_eq!(config.profile.height, 0.0); // default
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("fitlog").join("config.toml");

        let mut config = Config::default();
        config.data.data_dir = temp_dir.path().join("data");
        config.profile.height = 70.0;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.data.data_dir, temp_dir.path().join("data"));
        assert_eq!(loaded.profile.height, 70.0);
    }

    #[test]
    fn test_negative_height_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[profile]\nheight = -3.0\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_legacy_file_preferred_only_when_present() {
        let temp_dir = tempfile::tempdir().unwrap();
        let legacy = temp_dir.path().join("old").join("data.json");
        let data = DataConfig {
            data_dir: temp_dir.path().join("new"),
            legacy_file: Some(legacy.clone()),
        };

        assert_eq!(data.resolve_data_file(), temp_dir.path().join("new").join("data.json"));

        std::fs::create_dir_all(legacy.parent().unwrap()).unwrap();
        std::fs::write(&legacy, "{}").unwrap();
        assert_eq!(data.resolve_data_file(), legacy);
    }
}
