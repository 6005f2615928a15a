//! Application configuration
//!
//! Stored as TOML under the user's config directory. A missing file is
//! created with defaults so the binary always starts; a malformed file is
//! an error rather than being silently replaced.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::controller::profile::DeviceProfile;

const APP_DIR: &str = "rolepad";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("No config directory available on this platform")]
    NoConfigDir,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Length of one frame in milliseconds
    pub tick_interval_ms: u64,
    /// Joystick number used in button keycodes; 0 means any
    pub joystick_number: u8,
    /// Profile key to use regardless of the connected device
    pub preferred_profile: Option<String>,
    /// Frames between two button report dumps; 0 disables the report
    pub report_interval_ticks: u64,
    /// Use scripted input instead of a real gamepad
    pub headless: bool,
    /// Additional device profiles, checked before the built-in ones
    pub profiles: Vec<DeviceProfile>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 16,
            joystick_number: 0,
            preferred_profile: None,
            report_interval_ticks: 120,
            headless: false,
            profiles: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join(APP_DIR).join(CONFIG_FILE))
    }

    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Reading config from {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub async fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        tokio::fs::write(path, content).await.map_err(io_error)?;
        debug!("Wrote config to {}", path.display());
        Ok(())
    }

    /// Loads the config at `path`, writing the defaults there first if it does not exist
    pub async fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        if exists {
            let config = Self::load(path).await?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            info!("No config at {}, creating defaults", path.display());
            let config = Self::default();
            config.save(path).await?;
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::button::Button;
    use crate::controller::profile::{ButtonBinding, ButtonMapping};

    #[tokio::test]
    async fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("nested").join("config.toml");

        let config = AppConfig::load_or_create(&path).await.expect("load config");
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn custom_profiles_survive_a_round_trip() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("config.toml");

        let mut profile = DeviceProfile::xbox360_windows();
        profile.key = "arcade_stick".to_string();
        profile.buttons.push(ButtonBinding {
            button: Button::System,
            mapping: ButtonMapping::Digital { id: 10 },
        });

        let config = AppConfig {
            tick_interval_ms: 8,
            preferred_profile: Some("arcade_stick".to_string()),
            profiles: vec![profile],
            ..Default::default()
        };
        config.save(&path).await.expect("save config");

        let loaded = AppConfig::load(&path).await.expect("load config");
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("config.toml");
        tokio::fs::write(&path, "joystick_number = 2\n")
            .await
            .expect("write config");

        let loaded = AppConfig::load(&path).await.expect("load config");
        assert_eq!(loaded.joystick_number, 2);
        assert_eq!(loaded.tick_interval_ms, 16);
    }

    #[tokio::test]
    async fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("config.toml");
        tokio::fs::write(&path, "tick_interval_ms = \"fast\"\n")
            .await
            .expect("write config");

        let err = AppConfig::load(&path).await.expect_err("should fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
