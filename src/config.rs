//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::storage::backend::{BackendConfig, BackendKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Event storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// `file` or `relational` (`json` / `sqlite` also accepted)
    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: String,
}

fn default_data_dir() -> String {
    "./data/events".to_string()
}

fn default_sqlite_path() -> String {
    "./data/events.sqlite".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            data_dir: default_data_dir(),
            sqlite_path: default_sqlite_path(),
        }
    }
}

impl StorageConfig {
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            kind: self.backend,
            data_dir: PathBuf::from(&self.data_dir),
            sqlite_path: PathBuf::from(&self.sqlite_path),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Credential required for writes; writes are refused when unset
    #[serde(default)]
    pub admin_token: Option<String>,

    /// Requests per client per minute; 0 disables limiting
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,

    /// Directory that `/images/...` URLs resolve against
    #[serde(default = "default_media_root")]
    pub media_root: String,

    /// Cities accepted on create and update
    #[serde(default = "default_cities")]
    pub cities: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_rate_limit() -> u32 {
    50
}

fn default_media_root() -> String {
    "./public".to_string()
}

fn default_cities() -> Vec<String> {
    [
        "San Juan",
        "Bayamón",
        "Ponce",
        "Mayagüez",
        "Caguas",
        "Arecibo",
        "Guaynabo",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec!["http://localhost:3000".to_string()],
            admin_token: None,
            rate_limit_per_minute: default_rate_limit(),
            media_root: default_media_root(),
            cities: default_cities(),
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

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
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
            dirs::config_dir().map(|p| p.join("eventweek").join("config.toml")),
            Some(PathBuf::from("/etc/eventweek/config.toml")),
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
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Storage overrides; DATA_SOURCE is the legacy name
        if let Some(source) = lookup("EVENTWEEK_DATA_SOURCE").or_else(|| lookup("DATA_SOURCE")) {
            match source.parse() {
                Ok(kind) => self.storage.backend = kind,
                Err(e) => tracing::warn!("Ignoring data source override: {}", e),
            }
        }
        if let Some(data_dir) = lookup("EVENTWEEK_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }
        if let Some(path) = lookup("EVENTWEEK_SQLITE_PATH") {
            self.storage.sqlite_path = path;
        }

        // API overrides
        if let Some(host) = lookup("EVENTWEEK_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("EVENTWEEK_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }
        if let Some(token) = lookup("EVENTWEEK_ADMIN_TOKEN") {
            self.api.admin_token = Some(token).filter(|t| !t.is_empty());
        }
        if let Some(media_root) = lookup("EVENTWEEK_MEDIA_ROOT") {
            self.api.media_root = media_root;
        }

        // Logging overrides
        if let Some(level) = lookup("EVENTWEEK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("EVENTWEEK_LOG_FORMAT") {
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
    r#"# Eventweek Configuration
#
# Environment variables override these settings:
# - EVENTWEEK_DATA_SOURCE (or DATA_SOURCE)
# - EVENTWEEK_DATA_DIR
# - EVENTWEEK_SQLITE_PATH
# - EVENTWEEK_API_HOST
# - EVENTWEEK_API_PORT
# - EVENTWEEK_ADMIN_TOKEN
# - EVENTWEEK_MEDIA_ROOT
# - EVENTWEEK_LOG_LEVEL
# - EVENTWEEK_LOG_FORMAT

[storage]
# Backend: file (one JSON file per week) or relational (SQLite)
backend = "file"

# Directory holding <week>.json and _index.json
data_dir = "./data/events"

# SQLite database file for the relational backend
sqlite_path = "./data/events.sqlite"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8082

# Allowed CORS origins
cors_origins = ["http://localhost:3000"]

# Admin credential for write endpoints (cookie admin_auth or header x-admin-token)
# admin_token = "change-me"

# Requests per client per minute (0 disables limiting)
rate_limit_per_minute = 50

# Directory that /images/... URLs resolve against
media_root = "./public"

# Cities accepted on create and update
cities = ["San Juan", "Bayamón", "Ponce", "Mayagüez", "Caguas", "Arecibo", "Guaynabo"]

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage.backend, BackendKind::File);
        assert_eq!(config.api.rate_limit_per_minute, 50);
        assert_eq!(config.api.cities.len(), 7);
        assert!(config.api.admin_token.is_none());
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.storage.backend, BackendKind::File);
        assert_eq!(config.api.port, 8082);
        assert_eq!(config.api.cities, default_cities());
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_backend_aliases_in_toml() {
        let config = Config::parse("[storage]\nbackend = \"sqlite\"\n").unwrap();
        assert_eq!(config.storage.backend, BackendKind::Relational);

        let config = Config::parse("[storage]\nbackend = \"json\"\n").unwrap();
        assert_eq!(config.storage.backend, BackendKind::File);

        assert!(Config::parse("[storage]\nbackend = \"mongo\"\n").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[
            ("DATA_SOURCE", "sqlite"),
            ("EVENTWEEK_SQLITE_PATH", "/tmp/x.sqlite"),
            ("EVENTWEEK_API_PORT", "9000"),
            ("EVENTWEEK_ADMIN_TOKEN", "secret"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).cloned());

        assert_eq!(config.storage.backend, BackendKind::Relational);
        assert_eq!(config.storage.sqlite_path, "/tmp/x.sqlite");
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.admin_token.as_deref(), Some("secret"));

        let backend = config.storage.backend_config();
        assert_eq!(backend.kind, BackendKind::Relational);
        assert_eq!(backend.sqlite_path, PathBuf::from("/tmp/x.sqlite"));
    }

    #[test]
    fn test_new_env_name_wins_and_bad_values_are_ignored() {
        let vars = env(&[
            ("EVENTWEEK_DATA_SOURCE", "file"),
            ("DATA_SOURCE", "sqlite"),
            ("EVENTWEEK_API_PORT", "not-a-port"),
        ]);
        let mut config = Config::default();
        config.storage.backend = BackendKind::Relational;
        config.apply_overrides(|k| vars.get(k).cloned());
        assert_eq!(config.storage.backend, BackendKind::File);
        assert_eq!(config.api.port, 8082);

        let vars = env(&[("DATA_SOURCE", "postgres")]);
        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).cloned());
        assert_eq!(config.storage.backend, BackendKind::File);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Config::load(Path::new("/nonexistent/eventweek.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
