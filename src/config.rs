//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::dashboard::{MapView, DEFAULT_MAP_CENTER, DEFAULT_MAP_ZOOM};
use crate::service::DEFAULT_SERVICE_URL;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Prediction service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_url")]
    pub base_url: String,
}

fn default_service_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_service_url(),
        }
    }
}

/// Dashboard server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_center_lat")]
    pub map_center_lat: f64,

    #[serde(default = "default_center_lon")]
    pub map_center_lon: f64,

    #[serde(default = "default_zoom")]
    pub map_zoom: u8,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_center_lat() -> f64 {
    DEFAULT_MAP_CENTER[0]
}

fn default_center_lon() -> f64 {
    DEFAULT_MAP_CENTER[1]
}

fn default_zoom() -> u8 {
    DEFAULT_MAP_ZOOM
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            map_center_lat: default_center_lat(),
            map_center_lon: default_center_lon(),
            map_zoom: default_zoom(),
        }
    }
}

impl DashboardConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Initial map viewport
    pub fn map_view(&self) -> MapView {
        MapView {
            center: [self.map_center_lat, self.map_center_lon],
            zoom: self.map_zoom,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("aidscro").join("config.toml")),
            Some(PathBuf::from("/etc/aidscro/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("AIDSCRO_SERVICE_URL") {
            self.service.base_url = url;
        }

        if let Some(host) = lookup("AIDSCRO_HOST") {
            self.dashboard.host = host;
        }
        if let Some(port) = lookup("AIDSCRO_PORT") {
            match port.parse() {
                Ok(p) => self.dashboard.port = p,
                Err(_) => tracing::warn!("Ignoring invalid AIDSCRO_PORT: {}", port),
            }
        }

        if let Some(level) = lookup("AIDSCRO_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("AIDSCRO_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# AIDSCRO Dashboard Configuration
#
# Environment variables override these settings:
# - AIDSCRO_SERVICE_URL
# - AIDSCRO_HOST
# - AIDSCRO_PORT
# - AIDSCRO_LOG_LEVEL
# - AIDSCRO_LOG_FORMAT

[service]
# Base URL of the prediction service
base_url = "http://localhost:8000"

[dashboard]
# Dashboard server host
host = "127.0.0.1"

# Dashboard server port
port = 3000

# Map position before any city prediction
map_center_lat = 51.505
map_center_lon = -0.09
map_zoom = 13

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
