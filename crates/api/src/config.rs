use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};

/// Minimum length of the access link signing secret, in bytes.
pub const MIN_SIGNING_SECRET_LEN: usize = 16;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub access: AccessConfig,
    #[serde(default)]
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Which record store backs the access endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackendKind {
    Postgres,
    Memory,
    /// No store: access endpoints answer 503.
    #[serde(rename = "none")]
    Disabled,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_backend")]
    pub backend: StoreBackendKind,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

impl DatabaseConfig {
    /// Pool settings for the persistence layer.
    pub fn pool_config(&self) -> persistence::db::DatabaseConfig {
        persistence::db::DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}

/// Gated access settings.
#[derive(Clone, Deserialize)]
pub struct AccessConfig {
    /// HMAC secret for signed access links
    #[serde(default)]
    pub signing_secret: String,

    /// Lifetime of a signed access link (default: 86400 = 24 hours)
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: i64,

    /// Public base URL that access links point at
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// Allows admins to re-transition approved/rejected enrollments
    #[serde(default)]
    pub allow_status_override: bool,
}

impl std::fmt::Debug for AccessConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessConfig")
            .field("signing_secret", &"[REDACTED]")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("public_base_url", &self.public_base_url)
            .field("allow_status_override", &self.allow_status_override)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_store_backend() -> StoreBackendKind {
    StoreBackendKind::Postgres
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_token_ttl() -> i64 {
    shared::access_token::DEFAULT_TOKEN_TTL_SECS
}
fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with CA__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("CA").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Builds from embedded defaults so tests do not depend on config files.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [logging]
            level = "info"
            format = "json"

            [store]
            backend = "memory"

            [database]
            url = ""
            max_connections = 20
            min_connections = 5
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [access]
            signing_secret = "test-signing-secret-0123456789"
            token_ttl_secs = 86400
            public_base_url = "http://localhost:8080"
            allow_status_override = false

            [security]
            cors_origins = []
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.store.backend == StoreBackendKind::Postgres && self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "CA__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.store.backend != StoreBackendKind::Disabled
            && self.access.signing_secret.len() < MIN_SIGNING_SECRET_LEN
        {
            return Err(ConfigValidationError::MissingRequired(format!(
                "CA__ACCESS__SIGNING_SECRET must be at least {} bytes",
                MIN_SIGNING_SECRET_LEN
            )));
        }

        if self.access.token_ttl_secs <= 0 {
            return Err(ConfigValidationError::InvalidValue(
                "token_ttl_secs must be positive".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        self.socket_addr().map_err(|e| {
            ConfigValidationError::InvalidValue(format!("Invalid server address: {}", e))
        })?;

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load_with_defaults() {
        let config = Config::load_for_test(&[]).expect("Failed to load config");

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.backend, StoreBackendKind::Memory);
        assert_eq!(config.access.token_ttl_secs, 86_400);
        assert!(!config.access.allow_status_override);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_env_override() {
        let config = Config::load_for_test(&[
            ("server.port", "9000"),
            ("logging.level", "debug"),
            ("access.allow_status_override", "true"),
            ("store.backend", "none"),
        ])
        .expect("Failed to load config");

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.level, "debug");
        assert!(config.access.allow_status_override);
        assert_eq!(config.store.backend, StoreBackendKind::Disabled);
    }

    #[test]
    fn test_config_validation_postgres_requires_db_url() {
        let config = Config::load_for_test(&[("store.backend", "postgres")])
            .expect("Failed to load config");
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("CA__DATABASE__URL"));
    }

    #[test]
    fn test_config_validation_short_secret() {
        let config = Config::load_for_test(&[("access.signing_secret", "short")])
            .expect("Failed to load config");
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("SIGNING_SECRET"));
    }

    #[test]
    fn test_config_validation_disabled_store_needs_no_secret() {
        let config = Config::load_for_test(&[
            ("store.backend", "none"),
            ("access.signing_secret", ""),
        ])
        .expect("Failed to load config");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_non_positive_ttl() {
        let config = Config::load_for_test(&[("access.token_ttl_secs", "0")])
            .expect("Failed to load config");
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("token_ttl_secs"));
    }

    #[test]
    fn test_config_validation_invalid_pool_settings() {
        let config = Config::load_for_test(&[
            ("database.min_connections", "100"),
            ("database.max_connections", "10"),
        ])
        .expect("Failed to load config");

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("min_connections"));
    }

    #[test]
    fn test_socket_addr() {
        let config = Config::load_for_test(&[
            ("server.host", "127.0.0.1"),
            ("server.port", "3000"),
        ])
        .expect("Failed to load config");

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_socket_addr_invalid_host() {
        let config = Config::load_for_test(&[("server.host", "not a host")])
            .expect("Failed to load config");
        assert!(config.socket_addr().is_err());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_access_config_debug_redacts_secret() {
        let config = Config::load_for_test(&[]).expect("Failed to load config");
        let debug = format!("{:?}", config.access);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("test-signing-secret"));
    }

    #[test]
    fn test_pool_config_conversion() {
        let config = Config::load_for_test(&[("database.url", "postgres://localhost/test")])
            .expect("Failed to load config");
        let pool = config.database.pool_config();
        assert_eq!(pool.url, "postgres://localhost/test");
        assert_eq!(pool.max_connections, 20);
    }
}
