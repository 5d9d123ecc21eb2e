//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `PEER_REVIEW` prefix and
//! nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use peer_review_core::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Locks expire after {:?}", config.locking.timeout());
//! ```

mod database;
mod deviation;
mod error;
mod locking;
mod logging;
mod redis;
mod storage;

pub use database::DatabaseConfig;
pub use deviation::DeviationConfig;
pub use error::{ConfigError, ValidationError};
pub use locking::{LockBackend, LockingConfig};
pub use logging::{LogFormat, LoggingConfig};
pub use redis::RedisConfig;
pub use storage::{StorageBackend, StorageConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a working
/// in-memory setup. Load using [`AppConfig::load()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Response, answer and map persistence
    #[serde(default)]
    pub storage: StorageConfig,

    /// Edit lock timeout and backend
    #[serde(default)]
    pub locking: LockingConfig,

    /// Deviation check thresholds
    #[serde(default)]
    pub deviation: DeviationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PEER_REVIEW` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PEER_REVIEW__LOCKING__TIMEOUT_SECS=600` -> `locking.timeout_secs = 600`
    /// - `PEER_REVIEW__STORAGE__DATABASE__URL=...` -> `storage.database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PEER_REVIEW")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration sections
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.storage.validate()?;
        self.locking.validate()?;
        self.deviation.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Load and validate in one step.
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global; serialize the tests that touch them.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "PEER_REVIEW__STORAGE__BACKEND",
        "PEER_REVIEW__STORAGE__DATABASE__URL",
        "PEER_REVIEW__LOCKING__TIMEOUT_SECS",
        "PEER_REVIEW__LOCKING__BACKEND",
        "PEER_REVIEW__LOCKING__REDIS__URL",
        "PEER_REVIEW__DEVIATION__THRESHOLD_PERCENT",
        "PEER_REVIEW__LOGGING__FORMAT",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn empty_environment_yields_in_memory_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.locking.timeout_secs, 1200);
        assert_eq!(config.locking.backend, LockBackend::Storage);
        assert_eq!(config.deviation.threshold_percent, 15.0);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reads_nested_sections() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("PEER_REVIEW__STORAGE__BACKEND", "postgres");
        env::set_var("PEER_REVIEW__STORAGE__DATABASE__URL", "postgresql://test@localhost/reviews");
        env::set_var("PEER_REVIEW__LOCKING__TIMEOUT_SECS", "600");
        env::set_var("PEER_REVIEW__LOCKING__BACKEND", "redis");
        env::set_var("PEER_REVIEW__LOCKING__REDIS__URL", "redis://localhost:6379");
        env::set_var("PEER_REVIEW__LOGGING__FORMAT", "json");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(
            config.storage.database.as_ref().unwrap().url.expose_secret(),
            "postgresql://test@localhost/reviews"
        );
        assert_eq!(config.locking.timeout_secs, 600);
        assert_eq!(config.locking.backend, LockBackend::Redis);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn postgres_without_url_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("PEER_REVIEW__STORAGE__BACKEND", "postgres");
        let result = AppConfig::load_validated();
        clear_env();

        assert!(matches!(result, Err(ConfigError::ValidationFailed(_))));
    }
}
