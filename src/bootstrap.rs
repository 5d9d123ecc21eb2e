//! Composition root.
//!
//! Builds the adapters selected by [`AppConfig`] and wires every response
//! handler against them.

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::adapters::memory::{
    InMemoryAnswerRepository, InMemoryLockStore, InMemoryMapDirectory, InMemoryResponseRepository,
};
use crate::adapters::postgres::{
    PostgresAnswerRepository, PostgresEventOutbox, PostgresLockStore, PostgresMapDirectory,
    PostgresResponseRepository,
};
use crate::adapters::redis::RedisLockStore;
use crate::adapters::scoring::{DeviationPolicy, PeerAverageScorer};
use crate::adapters::InMemoryEventBus;
use crate::application::handlers::response::{
    DeleteResponseHandler, GetResponseHandler, OpenForEditHandler, ReleaseLockHandler, SaveDraftHandler,
    SubmitResponseHandler, ToggleVisibilityHandler,
};
use crate::application::services::{
    AnswerLedger, DeviationNotifier, LockManager, ReviewAccess, VersionStore,
};
use crate::config::{AppConfig, LockBackend, RedisConfig, StorageBackend, ValidationError};
use crate::ports::{
    AnswerRepository, Clock, EventPublisher, LockStore, ResponseMapReader, ResponseRepository,
    ReviewerDirectory, SystemClock,
};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis connection failed: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Port implementations the handlers run against.
#[derive(Clone)]
pub struct Adapters {
    pub maps: Arc<dyn ResponseMapReader>,
    pub directory: Arc<dyn ReviewerDirectory>,
    pub responses: Arc<dyn ResponseRepository>,
    pub answers: Arc<dyn AnswerRepository>,
    pub locks: Arc<dyn LockStore>,
    pub publisher: Arc<dyn EventPublisher>,
    pub clock: Arc<dyn Clock>,
}

/// Concrete in-memory adapters, kept reachable so maps can be seeded and
/// published events inspected.
#[derive(Clone, Default)]
pub struct InMemoryAdapters {
    pub directory: Arc<InMemoryMapDirectory>,
    pub responses: Arc<InMemoryResponseRepository>,
    pub answers: Arc<InMemoryAnswerRepository>,
    pub locks: Arc<InMemoryLockStore>,
    pub bus: Arc<InMemoryEventBus>,
}

impl InMemoryAdapters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ports(&self, clock: Arc<dyn Clock>) -> Adapters {
        Adapters {
            maps: self.directory.clone(),
            directory: self.directory.clone(),
            responses: self.responses.clone(),
            answers: self.answers.clone(),
            locks: self.locks.clone(),
            publisher: self.bus.clone(),
            clock,
        }
    }
}

/// Every response operation, wired and ready to call.
pub struct ReviewCore {
    pub open_for_edit: OpenForEditHandler,
    pub save_draft: SaveDraftHandler,
    pub submit: SubmitResponseHandler,
    pub release_lock: ReleaseLockHandler,
    pub delete: DeleteResponseHandler,
    pub toggle_visibility: ToggleVisibilityHandler,
    pub get: GetResponseHandler,
    memory: Option<InMemoryAdapters>,
}

impl ReviewCore {
    pub fn from_adapters(adapters: Adapters, lock_timeout: Duration, policy: DeviationPolicy) -> Self {
        let Adapters {
            maps,
            directory,
            responses,
            answers,
            locks,
            publisher,
            clock,
        } = adapters;

        let access = Arc::new(ReviewAccess::new(maps.clone(), directory));
        let locks = Arc::new(LockManager::new(locks, clock.clone()).with_timeout(lock_timeout));
        let ledger = Arc::new(AnswerLedger::new(answers.clone()));
        let versions = Arc::new(VersionStore::new(responses.clone(), clock.clone()));
        let scorer = Arc::new(PeerAverageScorer::new(maps, responses.clone(), answers, policy));
        let notifier = Arc::new(DeviationNotifier::new(scorer, publisher.clone(), clock.clone()));

        Self {
            open_for_edit: OpenForEditHandler::new(access.clone(), versions, locks.clone(), ledger.clone()),
            save_draft: SaveDraftHandler::new(
                responses.clone(),
                access.clone(),
                locks.clone(),
                ledger.clone(),
                clock.clone(),
            ),
            submit: SubmitResponseHandler::new(
                responses.clone(),
                access.clone(),
                locks.clone(),
                ledger.clone(),
                notifier,
                publisher.clone(),
                clock.clone(),
            ),
            release_lock: ReleaseLockHandler::new(locks.clone()),
            delete: DeleteResponseHandler::new(
                responses.clone(),
                access.clone(),
                locks.clone(),
                ledger.clone(),
                publisher,
                clock.clone(),
            ),
            toggle_visibility: ToggleVisibilityHandler::new(responses.clone(), access.clone(), clock),
            get: GetResponseHandler::new(responses, access, locks, ledger),
            memory: None,
        }
    }

    /// In-memory core driven by `clock`.
    pub fn in_memory(clock: Arc<dyn Clock>, lock_timeout: Duration, policy: DeviationPolicy) -> Self {
        let memory = InMemoryAdapters::new();
        let mut core = Self::from_adapters(memory.ports(clock), lock_timeout, policy);
        core.memory = Some(memory);
        core
    }

    /// Build the adapters named by `config` and wire the handlers.
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration or when a backing store is unreachable.
    pub async fn from_config(config: &AppConfig) -> Result<Self, BootstrapError> {
        config.validate()?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let timeout = config.locking.timeout();
        let policy = config.deviation.policy();

        let (mut adapters, memory) = match (config.storage.backend, &config.storage.database) {
            (StorageBackend::Postgres, Some(database)) => {
                let pool = PgPoolOptions::new()
                    .min_connections(database.min_connections)
                    .max_connections(database.max_connections)
                    .acquire_timeout(database.acquire_timeout())
                    .connect(database.url.expose_secret())
                    .await?;
                tracing::info!(max_connections = database.max_connections, "connected to postgres");

                let directory = Arc::new(PostgresMapDirectory::new(pool.clone()));
                let adapters = Adapters {
                    maps: directory.clone(),
                    directory,
                    responses: Arc::new(PostgresResponseRepository::new(pool.clone())),
                    answers: Arc::new(PostgresAnswerRepository::new(pool.clone())),
                    locks: Arc::new(PostgresLockStore::new(pool.clone())),
                    publisher: Arc::new(PostgresEventOutbox::new(pool)),
                    clock: clock.clone(),
                };
                (adapters, None)
            }
            (StorageBackend::Postgres, None) => {
                return Err(ValidationError::MissingRequired("STORAGE__DATABASE__URL").into());
            }
            (StorageBackend::Memory, _) => {
                tracing::warn!("using in-memory storage; data is lost on restart");
                let memory = InMemoryAdapters::new();
                (memory.ports(clock.clone()), Some(memory))
            }
        };

        if config.locking.backend == LockBackend::Redis {
            let redis = config
                .locking
                .redis
                .as_ref()
                .ok_or(ValidationError::MissingRequired("LOCKING__REDIS__URL"))?;
            adapters.locks = Arc::new(connect_redis_locks(redis).await?);
        }

        tracing::info!(
            storage = ?config.storage.backend,
            locking = ?config.locking.backend,
            lock_timeout_secs = timeout.as_secs(),
            "review core ready"
        );

        let mut core = Self::from_adapters(adapters, timeout, policy);
        core.memory = memory;
        Ok(core)
    }

    /// The in-memory adapters backing this core, if it was built on them.
    pub fn memory(&self) -> Option<&InMemoryAdapters> {
        self.memory.as_ref()
    }
}

async fn connect_redis_locks(config: &RedisConfig) -> Result<RedisLockStore, BootstrapError> {
    let client = redis::Client::open(config.url.expose_secret().as_str())?;
    let conn = client.get_multiplexed_tokio_connection().await?;
    tracing::info!(key_prefix = %config.key_prefix, "connected to redis lock store");
    Ok(RedisLockStore::new(conn).with_key_prefix(config.key_prefix.clone()))
}
