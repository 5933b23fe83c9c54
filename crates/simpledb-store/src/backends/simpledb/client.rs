//! The SimpleDB client seam.
//!
//! [`SimpleDbApi`] is the outbound contract the adapter needs from a SimpleDB
//! client: domain management, item get/put/delete, and `select`. The wire
//! protocol, request signing and retries live behind it.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Attribute map of a stored item.
pub type Attributes = BTreeMap<String, Value>;

/// One item returned by a select.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    /// The item name (its key).
    pub name: String,
    /// The item attributes.
    pub attributes: Attributes,
}

/// One page of select results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectOutput {
    /// Items on this page, in store order.
    pub items: Vec<SelectItem>,
    /// Token for the next page, if the result was truncated.
    pub next_token: Option<String>,
}

/// Errors reported by a SimpleDB client.
#[allow(missing_docs)]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("no such domain: {0}")]
    NoSuchDomain(String),
    #[error("invalid query expression: {0}")]
    InvalidQuery(String),
    #[error("request throttled: {0}")]
    Throttled(String),
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("invalid parameter: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    Internal(String),
}

/// Operations a SimpleDB client must provide.
#[async_trait]
pub trait SimpleDbApi: Send + Sync + Debug {
    /// Lists the names of all domains.
    async fn list_domains(&self) -> Result<Vec<String>, ClientError>;

    /// Creates a domain. Creating an existing domain succeeds.
    async fn create_domain(&self, domain: &str) -> Result<(), ClientError>;

    /// Deletes a domain and every item in it.
    async fn delete_domain(&self, domain: &str) -> Result<(), ClientError>;

    /// Fetches the attributes of one item, or `None` if it does not exist.
    async fn get_item(&self, domain: &str, key: &str) -> Result<Option<Attributes>, ClientError>;

    /// Writes an item, replacing any attributes it already had.
    async fn put_item(
        &self,
        domain: &str,
        key: &str,
        attributes: Attributes,
    ) -> Result<(), ClientError>;

    /// Deletes one item.
    async fn delete_item(&self, domain: &str, key: &str) -> Result<(), ClientError>;

    /// Runs a select expression and returns one page of results.
    async fn select(
        &self,
        query: &str,
        next_token: Option<&str>,
    ) -> Result<SelectOutput, ClientError>;
}

/// Exponential backoff bounds for retrying throttled requests.
///
/// Delays start at `min_wait` and double until they would exceed `max_wait`,
/// at which point the client gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    min_wait: Duration,
    max_wait: Duration,
}

impl Backoff {
    /// Creates backoff bounds. `min_wait` is raised to at least 1ms.
    pub fn new(min_wait: Duration, max_wait: Duration) -> Self {
        Self {
            min_wait: min_wait.max(Duration::from_millis(1)),
            max_wait,
        }
    }

    /// Returns the lower bound.
    pub fn min_wait(&self) -> Duration {
        self.min_wait
    }

    /// Returns the upper bound.
    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// Iterates over the retry delays.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        let max_wait = self.max_wait;
        std::iter::successors(Some(self.min_wait), |d| d.checked_mul(2))
            .take_while(move |d| *d <= max_wait)
    }
}
