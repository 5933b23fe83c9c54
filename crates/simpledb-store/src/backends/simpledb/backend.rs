//! SimpleDB backend core configuration and [`Backend`] implementation.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::{Backend, BackendCapability, BackendKind};
use crate::error::{BackendError, StorageError, StorageResult};
use crate::types::{DefaultEntityFactory, EntityFactory};

use super::client::{ClientError, SimpleDbApi};
use super::config::SimpleDbConfig;
use super::memory::MemorySimpleDb;

pub(crate) const BACKEND_NAME: &str = "simpledb-store";

const ERROR_CODE: &str = "entity/error";

/// SimpleDB backend.
///
/// Holds exactly one client handle for its lifetime.
/// [`SimpleDbBackend::disconnect`] drops the handle; operations issued afterwards fail with
/// `BackendError::Unavailable`.
#[derive(Debug)]
pub struct SimpleDbBackend {
    pub(crate) config: SimpleDbConfig,
    client: RwLock<Option<Arc<dyn SimpleDbApi>>>,
    pub(crate) factory: Arc<dyn EntityFactory>,
}

impl SimpleDbBackend {
    /// Creates a backend over an existing client.
    ///
    /// # Errors
    ///
    /// * `StorageError::Config` - If credentials are missing or waits are invalid
    pub fn with_client(
        config: SimpleDbConfig,
        client: Arc<dyn SimpleDbApi>,
    ) -> StorageResult<Self> {
        config.validate()?;
        Ok(Self::open(config, client))
    }

    /// Creates a backend over a fresh in-memory client.
    pub fn in_memory(config: SimpleDbConfig) -> StorageResult<Self> {
        config.validate()?;
        let client = MemorySimpleDb::new(config.backoff());
        Ok(Self::open(config, Arc::new(client)))
    }

    fn open(config: SimpleDbConfig, client: Arc<dyn SimpleDbApi>) -> Self {
        tracing::debug!(
            key_id = %config.key_id,
            min_wait = ?config.effective_min_wait(),
            max_wait = ?config.effective_max_wait(),
            "init: db open"
        );

        Self {
            config,
            client: RwLock::new(Some(client)),
            factory: Arc::new(DefaultEntityFactory),
        }
    }

    /// Replaces the factory used to build loaded entities.
    pub fn with_factory(mut self, factory: Arc<dyn EntityFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Returns backend configuration.
    pub fn config(&self) -> &SimpleDbConfig {
        &self.config
    }

    /// Returns `true` until [`SimpleDbBackend::disconnect`] has been called.
    pub async fn is_open(&self) -> bool {
        self.client.read().await.is_some()
    }

    /// Drops the client handle. Idempotent.
    pub async fn disconnect(&self) {
        if self.client.write().await.take().is_some() {
            tracing::debug!("close: db handle released");
        }
    }

    pub(crate) async fn client(&self) -> Result<Arc<dyn SimpleDbApi>, BackendError> {
        self.client
            .read()
            .await
            .clone()
            .ok_or_else(|| BackendError::Unavailable {
                backend_name: BACKEND_NAME.to_string(),
                message: "connection has been closed".to_string(),
            })
    }
}

/// Wraps a client failure into the generic store error and reports it.
pub(crate) fn store_error(err: ClientError) -> StorageError {
    tracing::debug!("error: {}", err);
    StorageError::Backend(BackendError::Store {
        backend_name: BACKEND_NAME.to_string(),
        code: ERROR_CODE,
        source: err,
    })
}

pub(crate) fn unsupported(capability: BackendCapability) -> StorageError {
    StorageError::Backend(BackendError::UnsupportedCapability {
        backend_name: BACKEND_NAME.to_string(),
        capability: capability.to_string(),
    })
}

#[async_trait]
impl Backend for SimpleDbBackend {
    type Connection = Arc<dyn SimpleDbApi>;

    fn kind(&self) -> BackendKind {
        BackendKind::SimpleDb
    }

    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn supports(&self, capability: BackendCapability) -> bool {
        matches!(
            capability,
            BackendCapability::Crud
                | BackendCapability::EqualitySearch
                | BackendCapability::CollectionDrop
                | BackendCapability::NativeAccess
        )
    }

    fn capabilities(&self) -> Vec<BackendCapability> {
        vec![
            BackendCapability::Crud,
            BackendCapability::EqualitySearch,
            BackendCapability::CollectionDrop,
            BackendCapability::NativeAccess,
        ]
    }

    async fn acquire(&self) -> Result<Self::Connection, BackendError> {
        self.client().await
    }

    async fn health_check(&self) -> Result<(), BackendError> {
        let client = self.acquire().await?;
        client
            .list_domains()
            .await
            .map(|_| ())
            .map_err(|e| BackendError::Unavailable {
                backend_name: BACKEND_NAME.to_string(),
                message: format!("SimpleDB health check failed: {e}"),
            })
    }
}
