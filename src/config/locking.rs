//! Edit lock configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::redis::RedisConfig;

const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Which store arbitrates edit locks.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LockBackend {
    /// Same backend as responses (memory or postgres).
    #[default]
    Storage,
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LockingConfig {
    /// How long a lock stays live after its last refresh.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub backend: LockBackend,

    /// Required when `backend = redis`.
    pub redis: Option<RedisConfig>,
}

impl LockingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ValidationError::InvalidLockTimeout);
        }
        match (self.backend, &self.redis) {
            (LockBackend::Redis, None) => Err(ValidationError::MissingRequired("LOCKING__REDIS__URL")),
            (LockBackend::Redis, Some(redis)) => redis.validate(),
            (LockBackend::Storage, _) => Ok(()),
        }
    }
}

impl Default for LockingConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            backend: LockBackend::default(),
            redis: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    1200
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_twenty_minutes() {
        assert_eq!(LockingConfig::default().timeout(), Duration::from_secs(20 * 60));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = LockingConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidLockTimeout));
    }

    #[test]
    fn redis_backend_requires_redis_section() {
        let config = LockingConfig {
            backend: LockBackend::Redis,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = LockingConfig {
            backend: LockBackend::Redis,
            redis: Some(RedisConfig::new("redis://localhost:6379")),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
