//! SimpleDB backend integration tests.
//!
//! These tests drive the store through the in-memory client, exercising the
//! codec, select translation and domain provisioning together.

mod common;

use std::time::Duration;

use serde_json::json;
use uuid::Uuid;

use simpledb_store::backends::simpledb::{SimpleDbBackend, SimpleDbConfig};
use simpledb_store::core::{Backend, EntityStore};
use simpledb_store::error::{BackendError, ConfigError, StorageError};
use simpledb_store::types::{Entity, EntityKind, FieldValue, Query, RemoveOutcome};

use common::*;

// ============================================================================
// Save / Load Tests
// ============================================================================

#[tokio::test]
async fn test_save_without_id_generates_uuid() {
    let backend = create_backend();
    let kind = foo_kind();

    let saved = backend
        .save(Entity::new(kind.clone()).with_field("p1", "v1"))
        .await
        .unwrap();

    let id = saved.id().expect("saved entity has an id");
    let parsed = Uuid::parse_str(id).expect("id is a uuid");
    assert_eq!(parsed.get_version_num(), 4);

    let loaded = backend
        .load(&kind, &Query::by_id(id))
        .await
        .unwrap()
        .expect("entity is stored");
    assert_eq!(loaded.id(), Some(id));
    assert_eq!(loaded.get("p1"), Some(&FieldValue::Text("v1".to_string())));
}

#[tokio::test]
async fn test_typed_fields_round_trip() {
    let backend = create_backend();
    let original = typed_entity("typed-1");

    backend.save(original.clone()).await.unwrap();
    let loaded = backend
        .load(&foo_kind(), &Query::by_id("typed-1"))
        .await
        .unwrap()
        .unwrap();

    assert_same_entity(&loaded, &original);
    assert_eq!(loaded.get("d1"), Some(&FieldValue::Date(fixed_date())));
}

#[tokio::test]
async fn test_update_replaces_fields() {
    let backend = create_backend();
    let kind = foo_kind();

    let saved = backend
        .save(
            Entity::new(kind.clone())
                .with_field("p1", "v1")
                .with_field("p2", "v2"),
        )
        .await
        .unwrap();

    let mut changed = saved.clone();
    changed.set("p1", "changed");
    changed.remove("p2");
    backend.save(changed).await.unwrap();

    let loaded = backend
        .load(&kind, &Query::by_id(saved.id().unwrap()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        loaded.get("p1"),
        Some(&FieldValue::Text("changed".to_string()))
    );
    assert!(loaded.get("p2").is_none());
}

#[tokio::test]
async fn test_load_nonexistent_returns_none() {
    let backend = create_backend();
    let loaded = backend
        .load(&foo_kind(), &Query::by_id("nonexistent"))
        .await
        .unwrap();
    assert!(loaded.is_none());
}

#[tokio::test]
async fn test_load_by_filter_is_unsupported() {
    let backend = create_backend();
    let err = backend
        .load(&foo_kind(), &Query::new().with("p1", "v1"))
        .await
        .unwrap_err();
    assert!(err.is_unsupported());
}

#[tokio::test]
async fn test_lookalike_strings_are_reinterpreted() {
    let backend = create_backend();
    let kind = foo_kind();

    backend
        .save(
            Entity::new(kind.clone())
                .with_id("lookalike")
                .with_field("flag", "true")
                .with_field("list", "[1,2,3]")
                .with_field("broken", "[1,2")
                .with_field("bad_json", "{not json}"),
        )
        .await
        .unwrap();

    let loaded = backend
        .load(&kind, &Query::by_id("lookalike"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.get("flag"), Some(&FieldValue::Bool(true)));
    assert_eq!(
        loaded.get("list"),
        Some(&FieldValue::Structured(json!([1, 2, 3])))
    );
    assert_eq!(
        loaded.get("broken"),
        Some(&FieldValue::Text("[1,2".to_string()))
    );
    assert_eq!(
        loaded.get("bad_json"),
        Some(&FieldValue::Text("{not json}".to_string()))
    );
}

// ============================================================================
// List Tests
// ============================================================================

#[tokio::test]
async fn test_list_filters_by_equality() {
    let backend = create_backend();
    let kind = foo_kind();

    for (id, color, size) in [("a", "red", 1), ("b", "red", 2), ("c", "blue", 1)] {
        backend
            .save(
                Entity::new(kind.clone())
                    .with_id(id)
                    .with_field("color", color)
                    .with_field("size", size),
            )
            .await
            .unwrap();
    }

    let red = backend
        .list(&kind, &Query::new().with("color", "red"))
        .await
        .unwrap();
    let ids: Vec<_> = red.iter().filter_map(Entity::id).collect();
    assert_eq!(ids, vec!["a", "b"]);

    let red_small = backend
        .list(&kind, &Query::new().with("color", "red").with("size", 1))
        .await
        .unwrap();
    assert_eq!(red_small.len(), 1);
    assert_eq!(red_small[0].id(), Some("a"));

    let everything = backend.list(&kind, &Query::new()).await.unwrap();
    assert_eq!(everything.len(), 3);
}

#[tokio::test]
async fn test_list_matches_boolean_fields() {
    let backend = create_backend();
    let kind = foo_kind();

    backend
        .save(Entity::new(kind.clone()).with_id("on").with_field("active", true))
        .await
        .unwrap();
    backend
        .save(Entity::new(kind.clone()).with_id("off").with_field("active", false))
        .await
        .unwrap();

    let active = backend
        .list(&kind, &Query::new().with("active", true))
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id(), Some("on"));
}

#[tokio::test]
async fn test_list_with_hostile_filter_value() {
    let backend = create_backend();
    let kind = foo_kind();
    let hostile = "x\" or 1=1 -- \\ 'quoted'\nnext %";

    backend
        .save(Entity::new(kind.clone()).with_id("h").with_field("name", hostile))
        .await
        .unwrap();
    backend
        .save(Entity::new(kind.clone()).with_id("x").with_field("name", "x"))
        .await
        .unwrap();

    let matched = backend
        .list(&kind, &Query::new().with("name", hostile))
        .await
        .unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].id(), Some("h"));
}

#[tokio::test]
async fn test_list_with_unusual_field_name() {
    let backend = create_backend();
    let kind = foo_kind();

    backend
        .save(
            Entity::new(kind.clone())
                .with_id("n")
                .with_field("first name", "Ann"),
        )
        .await
        .unwrap();

    let matched = backend
        .list(&kind, &Query::new().with("first name", "Ann"))
        .await
        .unwrap();
    assert_eq!(matched.len(), 1);
}

#[tokio::test]
async fn test_list_returns_first_page_only() {
    let (backend, _client) = create_backend_with_client(2);
    let kind = foo_kind();

    for i in 0..5 {
        backend
            .save(Entity::new(kind.clone()).with_field("n", i))
            .await
            .unwrap();
    }

    let listed = backend.list(&kind, &Query::new()).await.unwrap();
    assert_eq!(listed.len(), 2);
}

// ============================================================================
// Remove Tests
// ============================================================================

#[tokio::test]
async fn test_remove_all_then_list_recreates_domain() {
    let (backend, client) = create_backend_with_client(100);
    let kind = foo_kind();

    backend
        .save(Entity::new(kind.clone()).with_field("p1", "v1"))
        .await
        .unwrap();

    let outcome = backend.remove(&kind, &Query::all()).await.unwrap();
    assert_eq!(
        outcome,
        RemoveOutcome::DomainDeleted {
            domain: "moon_foo".to_string()
        }
    );
    assert!(client.domain_names().is_empty());

    let listed = backend.list(&kind, &Query::new()).await.unwrap();
    assert!(listed.is_empty());
    assert_eq!(client.domain_names(), vec!["moon_foo"]);
    assert_eq!(client.item_count("moon_foo"), Some(0));
}

#[tokio::test]
async fn test_remove_by_filter_deletes_matches() {
    let (backend, client) = create_backend_with_client(100);
    let kind = foo_kind();

    for (id, color) in [("a", "red"), ("b", "blue"), ("c", "red")] {
        backend
            .save(Entity::new(kind.clone()).with_id(id).with_field("color", color))
            .await
            .unwrap();
    }

    let outcome = backend
        .remove(&kind, &Query::new().with("color", "red"))
        .await
        .unwrap();
    assert!(matches!(outcome, RemoveOutcome::Dispatched { .. }));
    assert_eq!(outcome.ids(), ["a".to_string(), "c".to_string()]);

    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
    assert_eq!(client.item_count("moon_foo"), Some(1));
}

#[tokio::test]
async fn test_remove_with_awaited_deletes() {
    let backend =
        SimpleDbBackend::in_memory(test_config().with_await_bulk_deletes(true)).unwrap();
    let kind = foo_kind();

    backend
        .save(Entity::new(kind.clone()).with_id("a").with_field("p1", "v1"))
        .await
        .unwrap();

    let outcome = backend
        .remove(&kind, &Query::new().with("p1", "v1"))
        .await
        .unwrap();
    assert!(matches!(outcome, RemoveOutcome::Deleted { .. }));
    assert!(backend.list(&kind, &Query::new()).await.unwrap().is_empty());
}

// ============================================================================
// Domain and Lifecycle Tests
// ============================================================================

#[tokio::test]
async fn test_domain_naming() {
    let (backend, client) = create_backend_with_client(100);

    backend
        .save(Entity::new(EntityKind::new("bar")).with_field("p1", "v1"))
        .await
        .unwrap();
    backend
        .save(Entity::new(foo_kind()).with_field("p1", "v1"))
        .await
        .unwrap();

    assert_eq!(client.domain_names(), vec!["bar", "moon_foo"]);
}

#[tokio::test]
async fn test_native_returns_usable_client() {
    let backend = create_backend();

    let native = backend.native(&foo_kind()).await.unwrap();
    let domains = native.list_domains().await.unwrap();
    assert_eq!(domains, vec!["moon_foo"]);
}

#[tokio::test]
async fn test_throttled_requests_are_retried() {
    let (backend, client) = create_backend_with_client(100);
    client.throttle_next(2);

    let saved = backend
        .save(Entity::new(foo_kind()).with_field("p1", "v1"))
        .await;
    assert!(saved.is_ok());
}

#[tokio::test]
async fn test_persistent_throttling_surfaces_store_error() {
    let (backend, client) = create_backend_with_client(100);
    client.throttle_next(100);

    let err = backend.list(&foo_kind(), &Query::new()).await.unwrap_err();
    assert!(err.is_store_error());
}

#[tokio::test]
async fn test_close_then_operations_fail() {
    let backend = create_backend();
    assert!(backend.health_check().await.is_ok());

    backend.close().await.unwrap();
    backend.close().await.unwrap();

    let err = backend
        .save(Entity::new(foo_kind()).with_field("p1", "v1"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::Backend(BackendError::Unavailable { .. })
    ));
    assert!(backend.health_check().await.is_err());
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_missing_credentials_fail_fast() {
    let err = SimpleDbBackend::in_memory(SimpleDbConfig::new("AKID", "")).unwrap_err();
    assert!(matches!(
        err,
        StorageError::Config(ConfigError::MissingSetting { .. })
    ));
}

#[test]
fn test_inverted_waits_fail_fast() {
    let config = test_config()
        .with_min_wait(Duration::from_secs(5))
        .with_max_wait(Duration::from_secs(1));
    let err = SimpleDbBackend::in_memory(config).unwrap_err();
    assert!(matches!(
        err,
        StorageError::Config(ConfigError::InvalidSetting { .. })
    ));
}
