use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_channel_name() -> String {
    "Alarms".to_string()
}

/// app configuration persisted as TOML in the platform config directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// chrono format string the CLI renders alarm times with
    pub time_format: String,
    /// overrides the platform data directory the alarm store lives in
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// user visible name of the notification channel
    #[serde(default = "default_channel_name")]
    pub channel_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_format: "%l:%M %p".to_string(),
            data_dir: None,
            channel_name: default_channel_name(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&config)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let config = toml::to_string(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, config)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let mut path = directories::ProjectDirs::from("", "", "clarion_clock")
            .ok_or(ConfigError::NoProjectDirs)?
            .config_dir()
            .to_path_buf();
        path.push("config.toml");
        Ok(path)
    }

    /// where the alarm store keeps its files
    pub fn data_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(directories::ProjectDirs::from("", "", "clarion_clock")
                .ok_or(ConfigError::NoProjectDirs)?
                .data_dir()
                .to_path_buf()),
        }
    }

    #[must_use]
    pub fn is_config_present() -> bool {
        Self::config_path().map_or(false, |path| path.exists())
    }
}
