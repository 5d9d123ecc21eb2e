//! Storage configuration

use serde::Deserialize;

use super::database::DatabaseConfig;
use super::error::ValidationError;

/// Where responses, answers and maps live.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local maps; for tests and single-node demos.
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Required when `backend = postgres`.
    pub database: Option<DatabaseConfig>,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match (self.backend, &self.database) {
            (StorageBackend::Postgres, None) => Err(ValidationError::MissingRequired("STORAGE__DATABASE__URL")),
            (StorageBackend::Postgres, Some(database)) => database.validate(),
            (StorageBackend::Memory, _) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_needs_no_database() {
        assert!(StorageConfig::default().validate().is_ok());
    }

    #[test]
    fn postgres_requires_database_section() {
        let config = StorageConfig {
            backend: StorageBackend::Postgres,
            database: None,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn postgres_validates_database_section() {
        let config = StorageConfig {
            backend: StorageBackend::Postgres,
            database: Some(DatabaseConfig::new("postgresql://localhost/reviews")),
        };
        assert!(config.validate().is_ok());
    }
}
