//! [`EntityStore`] implementation for the SimpleDB backend.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::core::{BackendCapability, EntityStore};
use crate::error::{BackendError, StorageResult};
use crate::types::{Entity, EntityKind, Query, RemoveOutcome};

use super::backend::{BACKEND_NAME, SimpleDbBackend, store_error, unsupported};
use super::client::{SelectItem, SimpleDbApi};
use super::codec::{decode_attributes, encode_entity};
use super::domain::{ActiveDomain, drop_domain, ensure_domain};
use super::select::build_select;

impl SimpleDbBackend {
    fn build(&self, kind: &EntityKind, item: SelectItem) -> Entity {
        let (id, fields) = decode_attributes(item.attributes);
        let id = id.or(Some(item.name));
        self.factory.make(kind, id, fields)
    }

    fn delete_detached(&self, client: Arc<dyn SimpleDbApi>, domain: &str, ids: &[String]) {
        for id in ids {
            let client = Arc::clone(&client);
            let domain = domain.to_string();
            let id = id.clone();
            tokio::spawn(async move {
                if let Err(e) = client.delete_item(&domain, &id).await {
                    let err = store_error(e);
                    tracing::warn!(domain = %domain, id = %id, "remove: delete failed: {}", err);
                }
            });
        }
    }

    async fn delete_joined(
        &self,
        client: Arc<dyn SimpleDbApi>,
        domain: &str,
        ids: &[String],
    ) -> StorageResult<()> {
        let mut deletes = JoinSet::new();
        for id in ids {
            let client = Arc::clone(&client);
            let domain = domain.to_string();
            let id = id.clone();
            deletes.spawn(async move { client.delete_item(&domain, &id).await });
        }

        let mut first_error = None;
        while let Some(joined) = deletes.join_next().await {
            let failure = match joined {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => store_error(e),
                Err(e) => BackendError::Internal {
                    backend_name: BACKEND_NAME.to_string(),
                    message: "delete task did not complete".to_string(),
                    source: Some(Box::new(e)),
                }
                .into(),
            };
            if first_error.is_none() {
                first_error = Some(failure);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl EntityStore for SimpleDbBackend {
    type Native = Arc<dyn SimpleDbApi>;

    fn store_name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn save(&self, mut entity: Entity) -> StorageResult<Entity> {
        let ActiveDomain { client, name } = ensure_domain(self, entity.kind()).await?;

        let inserting = entity.is_new();
        let id = match (entity.id(), entity.requested_id()) {
            (Some(id), _) => id.to_string(),
            (None, Some(requested)) => requested.to_string(),
            (None, None) => Uuid::new_v4().to_string(),
        };

        let attributes = encode_entity(&entity, &id);
        client
            .put_item(&name, &id, attributes)
            .await
            .map_err(store_error)?;

        if inserting {
            tracing::debug!(domain = %name, id = %id, "save/insert");
            entity.assign_id(id);
        } else {
            tracing::debug!(domain = %name, id = %id, "save/update");
        }

        Ok(entity)
    }

    async fn load(&self, kind: &EntityKind, query: &Query) -> StorageResult<Option<Entity>> {
        let Some(id) = query.id() else {
            return Err(unsupported(BackendCapability::FilteredLoad));
        };

        let ActiveDomain { client, name } = ensure_domain(self, kind).await?;

        let Some(attributes) = client.get_item(&name, &id).await.map_err(store_error)? else {
            tracing::debug!(domain = %name, id = %id, "load: not found");
            return Ok(None);
        };

        let entity = self.build(
            kind,
            SelectItem {
                name: id,
                attributes,
            },
        );
        tracing::debug!(domain = %name, id = ?entity.id(), "load");
        Ok(Some(entity))
    }

    async fn list(&self, kind: &EntityKind, query: &Query) -> StorageResult<Vec<Entity>> {
        let ActiveDomain { client, name } = ensure_domain(self, kind).await?;

        let select = build_select(&name, query);
        let output = client.select(&select, None).await.map_err(store_error)?;

        if output.next_token.is_some() {
            tracing::debug!(domain = %name, "list: result truncated, later pages not fetched");
        }

        let entities: Vec<Entity> = output
            .items
            .into_iter()
            .map(|item| self.build(kind, item))
            .collect();

        tracing::debug!(domain = %name, count = entities.len(), "list");
        Ok(entities)
    }

    async fn remove(&self, kind: &EntityKind, query: &Query) -> StorageResult<RemoveOutcome> {
        if query.is_all() {
            let domain = drop_domain(self, kind).await?;
            return Ok(RemoveOutcome::DomainDeleted { domain });
        }

        let ActiveDomain { client, name } = ensure_domain(self, kind).await?;

        let select = build_select(&name, query);
        let output = client.select(&select, None).await.map_err(store_error)?;

        let ids: Vec<String> = output
            .items
            .into_iter()
            .map(|item| self.build(kind, item))
            .filter_map(|entity| entity.id().map(str::to_string))
            .collect();

        tracing::debug!(domain = %name, count = ids.len(), "remove");

        if self.config.await_bulk_deletes {
            self.delete_joined(client, &name, &ids).await?;
            Ok(RemoveOutcome::Deleted { domain: name, ids })
        } else {
            self.delete_detached(client, &name, &ids);
            Ok(RemoveOutcome::Dispatched { domain: name, ids })
        }
    }

    async fn native(&self, kind: &EntityKind) -> StorageResult<Self::Native> {
        let ActiveDomain { client, .. } = ensure_domain(self, kind).await?;
        Ok(client)
    }

    async fn close(&self) -> StorageResult<()> {
        self.disconnect().await;
        Ok(())
    }
}
