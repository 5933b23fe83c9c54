//! Domain naming and provisioning.
//!
//! Every entity kind lives in its own SimpleDB domain, named
//! `<base>_<name>` when the kind has a base and `<name>` otherwise. Domains
//! are created lazily: each operation first lists the existing domains and
//! creates the one it needs if it is missing.

use std::sync::Arc;

use crate::error::{QueryError, StorageResult};
use crate::types::EntityKind;

use super::backend::{SimpleDbBackend, store_error};
use super::client::SimpleDbApi;

/// Returns the domain name for an entity kind.
///
/// # Errors
///
/// * `QueryError::EmptyEntityName` - If the kind has an empty name
pub fn domain_name(kind: &EntityKind) -> StorageResult<String> {
    if kind.name().is_empty() {
        return Err(QueryError::EmptyEntityName.into());
    }

    Ok(match kind.base() {
        Some(base) => format!("{}_{}", base, kind.name()),
        None => kind.name().to_string(),
    })
}

/// A domain known to exist, together with the client that saw it.
#[derive(Debug, Clone)]
pub(crate) struct ActiveDomain {
    pub(crate) client: Arc<dyn SimpleDbApi>,
    pub(crate) name: String,
}

/// Makes sure the domain for `kind` exists, creating it if needed.
pub(crate) async fn ensure_domain(
    backend: &SimpleDbBackend,
    kind: &EntityKind,
) -> StorageResult<ActiveDomain> {
    let name = domain_name(kind)?;
    let client = backend.client().await?;

    let existing = client.list_domains().await.map_err(store_error)?;
    if !existing.iter().any(|d| d == &name) {
        client.create_domain(&name).await.map_err(store_error)?;
        tracing::debug!(domain = %name, "created domain");
    }

    Ok(ActiveDomain { client, name })
}

/// Deletes the domain for `kind` and every item in it.
pub(crate) async fn drop_domain(
    backend: &SimpleDbBackend,
    kind: &EntityKind,
) -> StorageResult<String> {
    let ActiveDomain { client, name } = ensure_domain(backend, kind).await?;
    client.delete_domain(&name).await.map_err(store_error)?;
    tracing::debug!(domain = %name, "deleted domain");
    Ok(name)
}
