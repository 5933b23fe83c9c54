//! Store backend implementations.
//!
//! # Available Backends
//!
//! | Backend | Module | Description |
//! |---------|--------|-------------|
//! | SimpleDB | [`simpledb`] | One domain per entity kind, select-based listing |
//!
//! # Example
//!
//! ```no_run
//! use simpledb_store::backends::simpledb::{SimpleDbBackend, SimpleDbConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SimpleDbConfig::from_env()?;
//! let backend = SimpleDbBackend::in_memory(config)?;
//! # Ok(())
//! # }
//! ```

pub mod simpledb;
