//! Backend abstraction for store clients.
//!
//! This module defines the [`Backend`] trait, which covers connection
//! lifecycle and runtime capability discovery for an entity store backend.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::BackendError;

/// Identifies the type of store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Amazon SimpleDB.
    SimpleDb,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::SimpleDb => write!(f, "simpledb"),
        }
    }
}

/// Capabilities that a backend may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendCapability {
    /// Basic save/load/list/remove.
    Crud,
    /// Load by arbitrary filter rather than by id.
    FilteredLoad,
    /// Equality-conjunction filters on list and remove.
    EqualitySearch,
    /// Following continuation tokens past the first page.
    Pagination,
    /// Dropping a whole collection in one call.
    CollectionDrop,
    /// Access to the raw client handle.
    NativeAccess,
}

impl std::fmt::Display for BackendCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BackendCapability::Crud => "crud",
            BackendCapability::FilteredLoad => "filtered-load",
            BackendCapability::EqualitySearch => "equality-search",
            BackendCapability::Pagination => "pagination",
            BackendCapability::CollectionDrop => "collection-drop",
            BackendCapability::NativeAccess => "native-access",
        };
        write!(f, "{}", name)
    }
}

/// A store backend holding a connection to its client.
///
/// # Example
///
/// ```ignore
/// use simpledb_store::core::{Backend, BackendCapability};
///
/// if !backend.supports(BackendCapability::Pagination) {
///     // list() returns the first page only
/// }
/// ```
#[async_trait]
pub trait Backend: Send + Sync + Debug {
    /// The connection handle used by this backend.
    type Connection: Send;

    /// Returns the kind of backend.
    fn kind(&self) -> BackendKind;

    /// Returns a human-readable name for this backend.
    fn name(&self) -> &'static str;

    /// Checks if this backend supports the given capability.
    fn supports(&self, capability: BackendCapability) -> bool;

    /// Returns all capabilities supported by this backend.
    fn capabilities(&self) -> Vec<BackendCapability>;

    /// Returns the connection handle, if the backend is still open.
    async fn acquire(&self) -> Result<Self::Connection, BackendError>;

    /// Checks if the backend is reachable.
    async fn health_check(&self) -> Result<(), BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_display() {
        assert_eq!(BackendKind::SimpleDb.to_string(), "simpledb");
    }

    #[test]
    fn test_backend_capability_display() {
        assert_eq!(BackendCapability::Crud.to_string(), "crud");
        assert_eq!(
            BackendCapability::EqualitySearch.to_string(),
            "equality-search"
        );
        assert_eq!(
            BackendCapability::CollectionDrop.to_string(),
            "collection-drop"
        );
    }
}
