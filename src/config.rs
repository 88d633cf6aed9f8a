//! Application configuration management.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::path::PathBuf;
use std::str::FromStr;

use crate::account::TokenSettings;

/// Longest accepted token lifetime, in days.
const MAX_EXPIRY_DAYS: i64 = 365;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Path to the users JSON file.
    pub users_file: PathBuf,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Token signing settings.
    pub token: TokenSettings,
    /// Argon2 memory cost in KiB.
    pub hash_memory_kib: u32,
    /// Argon2 iteration count.
    pub hash_iterations: u32,
    /// Argon2 degree of parallelism.
    pub hash_parallelism: u32,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log format (json or pretty).
    pub log_format: LogFormat,
    /// Allowed CORS origins (comma-separated, or * for all).
    pub cors_origins: Vec<String>,
}

/// Log output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable colored output.
    Pretty,
    /// JSON structured logging for production.
    Json,
}

impl Config {
    /// Load configuration from `.env` and environment variables.
    ///
    /// # Errors
    /// Returns an error if a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let log_format = match var("LOG_FORMAT", "pretty").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let cors_origins = var("CORS_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port: parse("PORT", var("PORT", "8000"))?,
            users_file: PathBuf::from(var("USERS_FILE", "./data/users.json")),
            database_url: non_empty("DATABASE_URL"),
            token: TokenSettings {
                secret: non_empty("JWT_SECRET"),
                issuer: var("JWT_ISSUER", "ms-user"),
                expiry_days: parse("JWT_EXPIRY_DAYS", var("JWT_EXPIRY_DAYS", "7"))?,
            },
            hash_memory_kib: parse("HASH_MEMORY_KIB", var("HASH_MEMORY_KIB", "19456"))?,
            hash_iterations: parse("HASH_ITERATIONS", var("HASH_ITERATIONS", "2"))?,
            hash_parallelism: parse("HASH_PARALLELISM", var("HASH_PARALLELISM", "1"))?,
            log_level: var("LOG_LEVEL", "info"),
            log_format,
            cors_origins,
        })
    }

    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns an error if validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.token.secret.as_deref() {
            None => tracing::warn!(
                "JWT_SECRET not set. Registration works, but every login will fail until it is configured."
            ),
            Some(secret) if secret.len() < 32 => tracing::warn!(
                "JWT_SECRET is shorter than 32 characters. Consider using a longer secret."
            ),
            Some(_) => {}
        }

        if self.token.expiry_days <= 0 || self.token.expiry_days > MAX_EXPIRY_DAYS {
            return Err(ConfigError::Invalid {
                key: "JWT_EXPIRY_DAYS",
                value: self.token.expiry_days.to_string(),
            });
        }

        // Ensure users file parent directory exists
        if let Some(parent) = self.users_file.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ConfigError::DataDirectoryCreationFailed(parent.display().to_string(), e)
                })?;
            }
        }

        Ok(())
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },

    #[error("Failed to create data directory '{0}': {1}")]
    DataDirectoryCreationFailed(String, std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.token.expiry_days, 7);
        assert_eq!(config.token.issuer, "ms-user");
        assert!(config.token.secret.is_none());
        assert!(config.database_url.is_none());
        assert_eq!(config.hash_memory_kib, 19456);
    }

    #[test]
    fn test_blank_secret_is_absent() {
        let config = config_from(&[("JWT_SECRET", "   ")]).unwrap();
        assert!(config.token.secret.is_none());
    }

    #[test]
    fn test_invalid_port() {
        let result = config_from(&[("PORT", "eighty")]);

        assert!(matches!(
            result,
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));
    }

    #[test]
    fn test_cors_origins_parsing() {
        let config =
            config_from(&[("CORS_ORIGINS", "http://localhost:3000, http://example.com")]).unwrap();

        assert_eq!(config.cors_origins.len(), 2);
        assert!(config.cors_origins.contains(&"http://localhost:3000".to_string()));
        assert!(config.cors_origins.contains(&"http://example.com".to_string()));
    }

    #[test]
    fn test_validate_creates_data_directory() {
        let dir = tempfile::tempdir().unwrap();
        let users_file = dir.path().join("nested").join("users.json");
        let config = config_from(&[("USERS_FILE", users_file.to_str().unwrap())]).unwrap();

        config.validate().unwrap();

        assert!(dir.path().join("nested").is_dir());
    }

    #[test]
    fn test_validate_rejects_non_positive_expiry() {
        let config = config_from(&[("JWT_EXPIRY_DAYS", "0")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_excessive_expiry() {
        let config = config_from(&[("JWT_EXPIRY_DAYS", "100000000")]).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "JWT_EXPIRY_DAYS", .. })
        ));

        let dir = tempfile::tempdir().unwrap();
        let users_file = dir.path().join("users.json");
        let config = config_from(&[
            ("JWT_EXPIRY_DAYS", "365"),
            ("USERS_FILE", users_file.to_str().unwrap()),
        ])
        .unwrap();
        assert!(config.validate().is_ok());
    }
}
