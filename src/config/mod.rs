use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::RetryConfig;
use crate::intensity::IntensityProfile;
use crate::models::Credentials;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub intensity: IntensityProfile,

    #[serde(default)]
    pub tracking: TrackingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_save_path")]
    pub save_path: String,

    #[serde(default = "default_list_path")]
    pub list_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub user_id: String,

    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Refuse fixes stamped earlier than the previous one
    #[serde(default = "default_true")]
    pub reject_out_of_order: bool,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8080/running_tracker_web/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_save_path() -> String {
    "/save_workout.php".to_string()
}

fn default_list_path() -> String {
    "/get_workouts.php".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            save_path: default_save_path(),
            list_path: default_list_path(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            reject_out_of_order: default_true(),
        }
    }
}

impl Config {
    /// Get config directory path (~/.run-tracker/)
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".run-tracker"))
    }

    /// Get config file path (~/.run-tracker/config.toml)
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file()?)
    }

    /// Load configuration from a file, falling back to defaults if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file()?)
    }

    /// Save configuration to a file, creating its directory
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Check if a bearer token is configured
    pub fn is_authenticated(&self) -> bool {
        !self.auth.token.is_empty()
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.auth.user_id.clone(), self.auth.token.clone())
    }
}
