//! SimpleDB backend implementation.
//!
//! Entities of one kind are stored as items of one SimpleDB domain, keyed by
//! entity id. The backend provides [`Backend`](crate::core::Backend) and
//! [`EntityStore`](crate::core::EntityStore) support over any
//! [`SimpleDbApi`] client; [`MemorySimpleDb`] is a process-local client.
//!
//! - [`codec`] - Field value encoding and tag-less decoding
//! - [`select`] - Query to select-expression translation
//! - [`domain`] - Domain naming and lazy provisioning

mod backend;
pub mod client;
pub mod codec;
mod config;
pub mod domain;
pub mod memory;
pub mod select;
mod storage;


pub use backend::SimpleDbBackend;
pub use client::{Attributes, Backoff, ClientError, SelectItem, SelectOutput, SimpleDbApi};
pub use config::{DEFAULT_MAX_WAIT, DEFAULT_MIN_WAIT, SimpleDbConfig};
pub use domain::domain_name;
pub use memory::MemorySimpleDb;
