use crate::errors::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const APP_NAME: &str = "dishanveshi";

pub const ENV_API_BASE: &str = "DISHANVESHI_API_BASE";
pub const ENV_MAPS_KEY: &str = "DISHANVESHI_MAPS_KEY";
pub const ENV_DATA_DIR: &str = "DISHANVESHI_DATA_DIR";
pub const ENV_LOG_LEVEL: &str = "DISHANVESHI_LOG_LEVEL";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DESTINATION: &str = "Pune";

/// Fixed trip parameters sent with every itinerary request
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TripParams {
    pub days: u32,
    pub travel_type: String,
    pub budget: String,
    pub mood: String,
    pub include_pois: bool,
    /// Mood sent alongside recommendation queries
    pub chat_mood: String,
}

impl Default for TripParams {
    fn default() -> Self {
        Self {
            days: 3,
            travel_type: "cultural".to_string(),
            budget: "medium".to_string(),
            mood: "relaxed".to_string(),
            include_pois: true,
            chat_mood: "neutral".to_string(),
        }
    }
}

/// Client configuration, loaded from `config.toml` and overridden by env and flags
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ClientConfig {
    pub api_base: Option<String>,
    pub maps_api_key: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
    pub default_destination: Option<String>,
    pub trip: Option<TripParams>,
}

impl ClientConfig {
    /// Loads configuration from a file if it exists, otherwise returns the default config
    pub fn load_from_file(path: &Path) -> ClientResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            ClientError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content)
            .map_err(|e| ClientError::ConfigError(format!("Failed to parse config file: {}", e)))
    }

    /// Saves configuration to a file
    pub fn save_to_file(&self, path: &Path) -> ClientResult<()> {
        let content = toml::to_string(self).map_err(|e| {
            ClientError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ClientError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        fs::write(path, content)
            .map_err(|e| ClientError::ConfigError(format!("Failed to write config file: {}", e)))
    }

    /// Builds an override layer from the process environment
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Builds an override layer from an arbitrary variable lookup
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            api_base: non_empty(ENV_API_BASE),
            maps_api_key: non_empty(ENV_MAPS_KEY),
            data_dir: non_empty(ENV_DATA_DIR).map(PathBuf::from),
            log_level: non_empty(ENV_LOG_LEVEL),
            ..Self::default()
        }
    }

    /// Merges this config with another config, preferring values from the other config if present
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            api_base: other.api_base.clone().or_else(|| self.api_base.clone()),
            maps_api_key: other
                .maps_api_key
                .clone()
                .or_else(|| self.maps_api_key.clone()),
            data_dir: other.data_dir.clone().or_else(|| self.data_dir.clone()),
            request_timeout_secs: other.request_timeout_secs.or(self.request_timeout_secs),
            log_level: other.log_level.clone().or_else(|| self.log_level.clone()),
            default_destination: other
                .default_destination
                .clone()
                .or_else(|| self.default_destination.clone()),
            trip: other.trip.clone().or_else(|| self.trip.clone()),
        }
    }

    /// Checks the settings required at startup and returns the parsed API base.
    ///
    /// A missing or unparsable base URL is fatal; everything else has a default.
    pub fn validate(&self) -> ClientResult<Url> {
        let raw = self
            .api_base
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ClientError::ConfigError(format!(
                    "API base URL missing. Set `api_base` in config.toml or {}",
                    ENV_API_BASE
                ))
            })?;

        let url = Url::parse(raw)
            .map_err(|e| ClientError::ConfigError(format!("Invalid API base URL {raw}: {e}")))?;

        match url.scheme() {
            "http" | "https" if url.has_host() => Ok(url),
            _ => Err(ClientError::ConfigError(format!(
                "API base URL must be an absolute http(s) URL, got {raw}"
            ))),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn trip(&self) -> TripParams {
        self.trip.clone().unwrap_or_default()
    }

    pub fn default_destination(&self) -> &str {
        self.default_destination
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(DEFAULT_DESTINATION)
    }

    /// Directory holding the durable credential slot
    pub fn data_dir(&self) -> ClientResult<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|d| d.join(APP_NAME))
            .ok_or_else(|| {
                ClientError::ConfigError("Could not determine data directory".to_string())
            })
    }
}

/// Helper function to get default config directory
pub fn get_default_config_dir() -> ClientResult<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        ClientError::ConfigError("Could not determine home directory".to_string())
    })?;

    Ok(home_dir.join(".config").join(APP_NAME))
}

/// Helper function to get default config file path
pub fn get_default_config_file() -> ClientResult<PathBuf> {
    Ok(get_default_config_dir()?.join("config.toml"))
}
