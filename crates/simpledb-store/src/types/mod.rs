//! Core types for the entity store.
//!
//! - [`Entity`], [`EntityKind`] - Records and their canonical names
//! - [`FieldValue`] - Typed field values
//! - [`Query`] - Equality filters
//! - [`RemoveOutcome`] - Result of a remove call
//! - [`EntityFactory`] - Host-supplied entity construction
//!
//! # Example
//!
//! ```
//! use simpledb_store::types::{Entity, EntityKind, FieldValue, Query};
//!
//! let kind = EntityKind::new("foo").with_base("moon");
//! let entity = Entity::new(kind)
//!     .with_field("p1", "v1")
//!     .with_field("p2", 2)
//!     .with_field("active", true);
//!
//! assert!(entity.is_new());
//! assert_eq!(entity.get("active"), Some(&FieldValue::Bool(true)));
//!
//! let query = Query::new().with("p1", "v1");
//! assert!(query.id().is_none());
//! ```

mod entity;
mod query;
mod value;

pub use entity::{DefaultEntityFactory, Entity, EntityFactory, EntityKind};
pub use query::{Query, RemoveOutcome};
pub use value::FieldValue;
