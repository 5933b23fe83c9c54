//! Entity store trait.
//!
//! This module defines the [`EntityStore`] trait: the five operations the
//! host persistence framework calls on a store plugin, plus `close`.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::types::{Entity, EntityKind, Query, RemoveOutcome};

/// The CRUD contract a store plugin offers to the host framework.
///
/// Every operation either returns its value or an error, never both. Store
/// failures are reported once, through the returned error.
///
/// # Example
///
/// ```ignore
/// use simpledb_store::core::EntityStore;
/// use simpledb_store::types::{Entity, EntityKind, Query};
///
/// async fn example<S: EntityStore>(store: &S) -> StorageResult<()> {
///     let kind = EntityKind::new("foo");
///
///     let saved = store.save(Entity::new(kind.clone()).with_field("p1", "v1")).await?;
///     let id = saved.id().unwrap().to_string();
///
///     let loaded = store.load(&kind, &Query::by_id(&id)).await?;
///     assert!(loaded.is_some());
///
///     let all = store.list(&kind, &Query::new()).await?;
///     store.remove(&kind, &Query::all()).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Raw client handle returned by [`EntityStore::native`].
    type Native: Send;

    /// Returns the store name used in error reports.
    fn store_name(&self) -> &'static str;

    /// Inserts or updates an entity.
    ///
    /// An entity without an id is inserted under its requested id or a newly
    /// generated one. An entity with an id is written over whatever is stored
    /// under that id.
    async fn save(&self, entity: Entity) -> StorageResult<Entity>;

    /// Loads one entity by id.
    ///
    /// Returns `Ok(None)` if nothing is stored under the id.
    ///
    /// # Errors
    ///
    /// * `BackendError::UnsupportedCapability` - If the query has no id
    async fn load(&self, kind: &EntityKind, query: &Query) -> StorageResult<Option<Entity>>;

    /// Lists entities matching an equality query.
    async fn list(&self, kind: &EntityKind, query: &Query) -> StorageResult<Vec<Entity>>;

    /// Removes matching entities, or the whole collection for [`Query::all`].
    async fn remove(&self, kind: &EntityKind, query: &Query) -> StorageResult<RemoveOutcome>;

    /// Returns the raw client handle for operations the store does not expose.
    async fn native(&self, kind: &EntityKind) -> StorageResult<Self::Native>;

    /// Releases the connection. Calling it again has no effect.
    async fn close(&self) -> StorageResult<()>;
}
