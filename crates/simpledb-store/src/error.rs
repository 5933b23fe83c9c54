//! Error types for the entity store.
//!
//! This module defines all error types used throughout the adapter, following
//! a hierarchy that separates configuration errors, query errors, and errors
//! originating from the backing store.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::backends::simpledb::client::ClientError;

/// The primary error type for all store operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Configuration precondition errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Query shape errors
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors raised while validating adapter configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required setting is absent or blank.
    #[error("missing required setting: {setting}")]
    MissingSetting { setting: String },

    /// A setting has a value outside its allowed range.
    #[error("invalid setting {setting}: {message}")]
    InvalidSetting { setting: String, message: String },
}

/// Errors related to the shape of a query.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The entity kind has no usable name.
    #[error("entity kind has an empty name")]
    EmptyEntityName,
}

/// Errors originating from the backing store.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend is currently unavailable.
    #[error("backend unavailable: {backend_name}: {message}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// The requested capability is not supported by this backend.
    #[error("capability '{capability}' not supported by {backend_name}")]
    UnsupportedCapability {
        backend_name: String,
        capability: String,
    },

    /// The store client reported a failure.
    #[error("{code} in {backend_name}: {source}")]
    Store {
        backend_name: String,
        code: &'static str,
        #[source]
        source: ClientError,
    },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result type alias for store operations.
pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Returns `true` if the error came from the store client.
    pub fn is_store_error(&self) -> bool {
        matches!(self, StorageError::Backend(BackendError::Store { .. }))
    }

    /// Returns `true` if the operation is not supported by the backend.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            StorageError::Backend(BackendError::UnsupportedCapability { .. })
        )
    }
}
