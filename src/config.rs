//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::auth::{DEFAULT_TOKEN_TTL_DAYS, MAX_TOKEN_TTL_DAYS};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8800
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("bookfinder").join("bookfinder.db").to_string_lossy().to_string())
        .unwrap_or_else(|| "./bookfinder_data/bookfinder.db".to_string())
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Token signing configuration
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for session tokens. When unset, a random per-process
    /// secret is generated at startup.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: i64,
}

fn default_token_ttl_days() -> i64 {
    DEFAULT_TOKEN_TTL_DAYS
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_days: default_token_ttl_days(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_days", &self.token_ttl_days)
            .finish()
    }
}

/// Book catalog seeding
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    /// JSON array of books inserted when the catalog is empty
    #[serde(default)]
    pub seed_path: Option<String>,
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

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Reject values that parse but cannot be used
    pub fn validate(&self) -> Result<(), ConfigError> {
        let days = self.auth.token_ttl_days;
        if !(1..=MAX_TOKEN_TTL_DAYS).contains(&days) {
            return Err(ConfigError::Invalid(format!(
                "auth.token_ttl_days must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_DAYS, days
            )));
        }
        Ok(())
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
            dirs::config_dir().map(|p| p.join("bookfinder").join("config.toml")),
            Some(PathBuf::from("/etc/bookfinder/config.toml")),
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

    /// Apply overrides from any key lookup (the process environment in production)
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Server overrides
        if let Some(host) = var("BOOKFINDER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("BOOKFINDER_PORT").or_else(|| var("PORT")) {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        // Database overrides
        if let Some(path) = var("BOOKFINDER_DB_PATH") {
            self.database.path = path;
        }

        // Auth overrides
        if let Some(secret) = var("BOOKFINDER_JWT_SECRET").or_else(|| var("JWT_SECRET")) {
            self.auth.jwt_secret = Some(secret);
        }
        if let Some(days) = var("BOOKFINDER_TOKEN_TTL_DAYS") {
            if let Ok(d) = days.parse() {
                self.auth.token_ttl_days = d;
            }
        }

        // Catalog overrides
        if let Some(path) = var("BOOKFINDER_SEED_PATH") {
            self.catalog.seed_path = Some(path);
        }

        // Logging overrides
        if let Some(level) = var("BOOKFINDER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("BOOKFINDER_LOG_FORMAT") {
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

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Book Finder Configuration
#
# Environment variables override these settings:
# - BOOKFINDER_HOST
# - BOOKFINDER_PORT (or PORT)
# - BOOKFINDER_DB_PATH
# - BOOKFINDER_JWT_SECRET (or JWT_SECRET)
# - BOOKFINDER_TOKEN_TTL_DAYS
# - BOOKFINDER_SEED_PATH
# - BOOKFINDER_LOG_LEVEL
# - BOOKFINDER_LOG_FORMAT

[server]
# API server host
host = "0.0.0.0"

# API server port
port = 8800

# Allowed CORS origins (empty = any origin)
cors_origins = []

[database]
# SQLite database file
path = "./bookfinder_data/bookfinder.db"

[auth]
# Secret used to sign session tokens. Leave unset to generate a random
# secret on every start (all sessions end when the server restarts).
# jwt_secret = "change-me"

# Session token lifetime in days
token_ttl_days = 7

[catalog]
# JSON array of books inserted when the books table is empty
# seed_path = "./catalog.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
