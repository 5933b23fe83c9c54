//! Equality queries and remove outcomes.

use std::collections::BTreeMap;

use super::value::FieldValue;

/// An equality filter over entity fields.
///
/// Every entry constrains one field to one value; entries are combined with
/// logical AND. Keys are kept sorted so translated queries are deterministic.
/// The `all` flag is only honoured by `remove`, where it drops the whole
/// collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filters: BTreeMap<String, FieldValue>,
    all: bool,
}

impl Query {
    /// Creates an empty query, matching every entity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query carrying the remove-everything flag.
    pub fn all() -> Self {
        Self {
            filters: BTreeMap::new(),
            all: true,
        }
    }

    /// Creates a query selecting one entity by id.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().with("id", id.into())
    }

    /// Adds an equality constraint.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    /// Returns the constraints in key order.
    pub fn filters(&self) -> &BTreeMap<String, FieldValue> {
        &self.filters
    }

    /// Returns `true` if the query has no constraints.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns `true` if the remove-everything flag is set.
    pub fn is_all(&self) -> bool {
        self.all
    }

    /// Returns the id constraint, if one is present and non-empty.
    pub fn id(&self) -> Option<String> {
        match self.filters.get("id")? {
            FieldValue::Text(s) if !s.is_empty() => Some(s.clone()),
            FieldValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// What a `remove` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The whole domain was deleted.
    DomainDeleted {
        /// Domain name.
        domain: String,
    },
    /// Item deletes were dispatched without waiting for them.
    Dispatched {
        /// Domain name.
        domain: String,
        /// Ids of the matched items.
        ids: Vec<String>,
    },
    /// Item deletes were dispatched and all of them completed.
    Deleted {
        /// Domain name.
        domain: String,
        /// Ids of the deleted items.
        ids: Vec<String>,
    },
}

impl RemoveOutcome {
    /// Returns the ids of matched items; empty when the domain was dropped.
    pub fn ids(&self) -> &[String] {
        match self {
            RemoveOutcome::DomainDeleted { .. } => &[],
            RemoveOutcome::Dispatched { ids, .. } | RemoveOutcome::Deleted { ids, .. } => ids,
        }
    }
}
