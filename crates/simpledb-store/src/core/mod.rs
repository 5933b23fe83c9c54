//! Core storage traits and abstractions.
//!
//! - [`Backend`] - Connection lifecycle and capability discovery
//! - [`EntityStore`] - The CRUD contract offered to the host framework

pub mod backend;
pub mod store;

pub use backend::{Backend, BackendCapability, BackendKind};
pub use store::EntityStore;
