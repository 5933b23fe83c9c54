//! SimpleDB entity store
//!
//! This crate is a storage adapter that lets an entity persistence framework
//! keep its records in Amazon SimpleDB. Each entity kind maps to one domain,
//! each entity to one item keyed by its id.
//!
//! # Features
//!
//! - **CRUD**: save (insert or update), load by id, list by equality filter,
//!   remove by filter or drop the whole collection
//! - **Lazy provisioning**: domains are created on first use
//! - **Typed values**: booleans, numbers, dates and nested structures survive
//!   a save/load round trip through SimpleDB's string attributes
//! - **Safe queries**: every value interpolated into a select is escaped
//!
//! # Architecture
//!
//! - [`types`] - Entities, field values, queries
//! - [`error`] - Error types for all operations
//! - [`core`] - Store and backend traits
//! - [`backends`] - The SimpleDB backend and its client seam
//!
//! # Quick Start
//!
//! ```no_run
//! use simpledb_store::backends::simpledb::{SimpleDbBackend, SimpleDbConfig};
//! use simpledb_store::core::EntityStore;
//! use simpledb_store::types::{Entity, EntityKind, Query};
//!
//! # async fn example() -> simpledb_store::StorageResult<()> {
//! let backend = SimpleDbBackend::in_memory(SimpleDbConfig::new("AKID", "SECRET"))?;
//! let kind = EntityKind::new("foo").with_base("moon");
//!
//! let saved = backend
//!     .save(Entity::new(kind.clone()).with_field("p1", "v1").with_field("p2", true))
//!     .await?;
//!
//! let loaded = backend
//!     .load(&kind, &Query::by_id(saved.id().unwrap_or_default()))
//!     .await?;
//! assert!(loaded.is_some());
//!
//! let matches = backend.list(&kind, &Query::new().with("p1", "v1")).await?;
//! assert_eq!(matches.len(), 1);
//!
//! backend.remove(&kind, &Query::all()).await?;
//! backend.close().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod core;
pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{StorageError, StorageResult};
