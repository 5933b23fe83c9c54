//! Test infrastructure for the SimpleDB entity store.
//!
//! Builds backends over the in-memory client and provides entity fixtures
//! shared by the integration tests.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use simpledb_store::backends::simpledb::{
    MemorySimpleDb, SimpleDbApi, SimpleDbBackend, SimpleDbConfig,
};
use simpledb_store::types::{Entity, EntityKind, FieldValue};

/// Configuration with test credentials and short waits.
pub fn test_config() -> SimpleDbConfig {
    SimpleDbConfig::new("AKID", "SECRET")
        .with_min_wait(Duration::from_millis(1))
        .with_max_wait(Duration::from_millis(8))
}

/// Creates a backend over a fresh in-memory client.
pub fn create_backend() -> SimpleDbBackend {
    SimpleDbBackend::in_memory(test_config()).expect("Failed to create SimpleDB backend")
}

/// Creates a backend and also returns its in-memory client.
pub fn create_backend_with_client(page_size: usize) -> (SimpleDbBackend, Arc<MemorySimpleDb>) {
    let config = test_config();
    let client = Arc::new(MemorySimpleDb::new(config.backoff()).with_page_size(page_size));
    let handle: Arc<dyn SimpleDbApi> = client.clone();
    let backend =
        SimpleDbBackend::with_client(config, handle).expect("Failed to create SimpleDB backend");
    (backend, client)
}

/// The `moon_foo` kind.
pub fn foo_kind() -> EntityKind {
    EntityKind::new("foo").with_base("moon")
}

/// A fixed timestamp with millisecond precision.
pub fn fixed_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2014, 3, 1, 12, 30, 15)
        .single()
        .expect("valid timestamp")
        + chrono::Duration::milliseconds(250)
}

/// An entity carrying one field of every supported shape.
pub fn typed_entity(id: &str) -> Entity {
    Entity::new(foo_kind())
        .with_id(id)
        .with_field("s1", "text value")
        .with_field("n1", 42)
        .with_field("f1", 1.5)
        .with_field("b1", true)
        .with_field("b2", false)
        .with_field("d1", fixed_date())
        .with_field("o1", json!({"a": [1, 2, {"b": "c"}]}))
        .with_field("a1", json!([1, 2, 3]))
}

/// Asserts that two entities carry the same id and fields.
pub fn assert_same_entity(actual: &Entity, expected: &Entity) {
    assert_eq!(actual.id(), expected.id(), "id mismatch");
    let actual_fields: Vec<(&str, &FieldValue)> = actual.fields().collect();
    let expected_fields: Vec<(&str, &FieldValue)> = expected.fields().collect();
    assert_eq!(actual_fields, expected_fields, "field mismatch");
}
