//! Calorie Quest configuration management
//!
//! Handles configuration from environment variables and TOML files with
//! development defaults. The store connection string has no usable default:
//! `validate()` rejects a configuration without one, and rejects the
//! development signing secret outside the in-memory store.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Connection string that selects the in-process document store
pub const MEMORY_STORE_URL: &str = "mem://";

/// Signing secret used when `JWT_SECRET` is not set; only accepted with the
/// in-memory store
pub const DEVELOPMENT_JWT_SECRET: &str = "development-secret-key-change-in-production";

/// Shortest signing secret accepted for a persistent store, in bytes
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Document store connection
    pub database: DatabaseConfig,

    /// Token and password hashing settings
    pub auth: AuthConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_vars(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        self.apply_vars(|key| std::env::var(key).ok())?;
        Ok(self)
    }

    /// Overwrite every setting whose variable `var` returns
    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        // Server
        if let Some(host) = var("API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("API_PORT") {
            self.server.port = parse_var("API_PORT", port)?;
        }

        // CORS origins from environment variable (comma-separated)
        if let Some(origins) = var("CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Document store
        if let Some(url) = var("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(user) = var("SURREALDB_USER") {
            self.database.username = user;
        }
        if let Some(pass) = var("SURREALDB_PASS") {
            self.database.password = pass;
        }
        if let Some(ns) = var("SURREALDB_NAMESPACE") {
            self.database.namespace = ns;
        }
        if let Some(db) = var("SURREALDB_DATABASE") {
            self.database.database = db;
        }

        // Tokens
        if let Some(secret) = var("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(secs) = var("JWT_ACCESS_EXPIRATION_SECS") {
            self.auth.access_token_ttl_secs = parse_var("JWT_ACCESS_EXPIRATION_SECS", secs)?;
        }

        // Logging
        if let Some(level) = var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = var("LOG_JSON") {
            self.logging.json_format = parse_var("LOG_JSON", json)?;
        }

        Ok(())
    }

    /// Check the settings the server cannot start without
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::MissingRequired("DATABASE_URL".to_string()));
        }
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }
        // Persistent stores need a private secret of full length
        if !self.database.is_memory() {
            if self.auth.jwt_secret == DEVELOPMENT_JWT_SECRET {
                return Err(ConfigError::InsecureSecret(
                    "the development default is not allowed with a persistent store",
                ));
            }
            if self.auth.jwt_secret.len() < MIN_JWT_SECRET_LEN {
                return Err(ConfigError::InsecureSecret("must be at least 32 bytes"));
            }
        }
        if self.auth.access_token_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "JWT_ACCESS_EXPIRATION_SECS".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum request body size in bytes
    pub max_body_size: usize,

    /// Allowed origins for CORS (any origin when empty)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_body_size: 1024 * 1024, // 1MB
            cors_origins: vec![],
        }
    }
}

/// Document store connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection string (`ws://host:port` for SurrealDB, `mem://` for in-process)
    pub url: String,

    /// SurrealDB root username
    pub username: String,

    /// SurrealDB root password
    pub password: String,

    /// SurrealDB namespace
    pub namespace: String,

    /// SurrealDB database name
    pub database: String,
}

impl DatabaseConfig {
    /// Whether the connection string selects the in-process store
    pub fn is_memory(&self) -> bool {
        self.url.trim() == MEMORY_STORE_URL
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: "root".to_string(),
            password: "root".to_string(),
            namespace: "calorie_quest".to_string(),
            database: "calories-quest".to_string(),
        }
    }
}

/// Token signing and password hashing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC-SHA256 signing secret
    pub jwt_secret: String,

    /// Access token lifetime in seconds
    pub access_token_ttl_secs: u64,

    /// Argon2 memory cost in KiB
    pub argon2_memory_kib: u32,

    /// Argon2 iterations
    pub argon2_iterations: u32,

    /// Argon2 lanes
    pub argon2_parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
            access_token_ttl_secs: 30 * 60,
            argon2_memory_kib: 19 * 1024,
            argon2_iterations: 2,
            argon2_parallelism: 1,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Insecure JWT_SECRET: {0}")]
    InsecureSecret(&'static str),
}
