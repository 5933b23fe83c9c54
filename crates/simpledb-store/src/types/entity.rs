//! Entities and entity kinds.
//!
//! An [`Entity`] is a record managed by the host persistence framework: a
//! field map plus an identifier. Its [`EntityKind`] is the canonical name the
//! host assigns to the record type, and determines which domain stores it.

use std::collections::BTreeMap;
use std::fmt;

use super::value::FieldValue;

/// Canonical name of an entity type: `zone/base/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKind {
    zone: Option<String>,
    base: Option<String>,
    name: String,
}

impl EntityKind {
    /// Creates a kind with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            zone: None,
            base: None,
            name: name.into(),
        }
    }

    /// Sets the base (namespace) of the kind.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into()).filter(|b: &String| !b.is_empty());
        self
    }

    /// Sets the zone of the kind.
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into()).filter(|z: &String| !z.is_empty());
        self
    }

    /// Returns the kind name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the base, if any.
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Returns the zone, if any.
    pub fn zone(&self) -> Option<&str> {
        self.zone.as_deref()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.zone.as_deref().unwrap_or("-"),
            self.base.as_deref().unwrap_or("-"),
            self.name
        )
    }
}

/// A record stored through an entity store.
///
/// The presence of [`Entity::id`] decides between insert and update on save.
/// A caller that wants to choose the id of a new entity sets
/// [`Entity::with_requested_id`] instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    kind: EntityKind,
    id: Option<String>,
    requested_id: Option<String>,
    fields: BTreeMap<String, FieldValue>,
}

impl Entity {
    /// Creates a new, unsaved entity of the given kind.
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            id: None,
            requested_id: None,
            fields: BTreeMap::new(),
        }
    }

    /// Sets the identifier, marking the entity as persisted.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Requests a specific identifier for the next insert.
    pub fn with_requested_id(mut self, id: impl Into<String>) -> Self {
        self.requested_id = Some(id.into());
        self
    }

    /// Sets a field, builder style.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets a field. The `id` name is reserved for the identifier.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        if name == "id" {
            self.id = match value {
                FieldValue::Text(s) => Some(s),
                FieldValue::Number(n) => Some(n.to_string()),
                _ => None,
            };
        } else {
            self.fields.insert(name, value);
        }
    }

    /// Returns a field value.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Removes a field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// Returns the entity kind.
    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// Returns the identifier, if the entity has been persisted.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns the identifier requested for insert, if any.
    pub fn requested_id(&self) -> Option<&str> {
        self.requested_id.as_deref()
    }

    pub(crate) fn assign_id(&mut self, id: String) {
        self.id = Some(id);
        self.requested_id = None;
    }

    /// Returns `true` if the entity has no identifier yet.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Iterates over the data fields, excluding the identifier.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the data field names.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }
}

/// Builds entities from decoded store data.
///
/// The host framework supplies this capability so that entities returned by
/// `load` and `list` carry whatever behaviour the host attaches to them.
pub trait EntityFactory: Send + Sync + fmt::Debug {
    /// Creates an entity of `kind` with the given id and fields.
    fn make(
        &self,
        kind: &EntityKind,
        id: Option<String>,
        fields: BTreeMap<String, FieldValue>,
    ) -> Entity;
}

/// Factory producing plain [`Entity`] values.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEntityFactory;

impl EntityFactory for DefaultEntityFactory {
    fn make(
        &self,
        kind: &EntityKind,
        id: Option<String>,
        fields: BTreeMap<String, FieldValue>,
    ) -> Entity {
        Entity {
            kind: kind.clone(),
            id,
            requested_id: None,
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        let kind = EntityKind::new("foo").with_base("moon");
        assert_eq!(kind.to_string(), "-/moon/foo");
        assert_eq!(EntityKind::new("bar").to_string(), "-/-/bar");
    }

    #[test]
    fn test_empty_base_is_ignored() {
        let kind = EntityKind::new("foo").with_base("");
        assert_eq!(kind.base(), None);
    }

    #[test]
    fn test_set_id_field_routes_to_identifier() {
        let mut entity = Entity::new(EntityKind::new("foo"));
        entity.set("id", "abc");
        entity.set("p1", "v1");
        assert_eq!(entity.id(), Some("abc"));
        assert_eq!(entity.field_names(), vec!["p1"]);
        assert!(!entity.is_new());
    }

    #[test]
    fn test_assign_id_clears_requested_id() {
        let mut entity = Entity::new(EntityKind::new("foo")).with_requested_id("wanted");
        assert!(entity.is_new());
        entity.assign_id("wanted".to_string());
        assert_eq!(entity.id(), Some("wanted"));
        assert_eq!(entity.requested_id(), None);
    }

    #[test]
    fn test_default_factory_builds_entity() {
        let mut fields = BTreeMap::new();
        fields.insert("a".to_string(), FieldValue::from(1));
        let entity =
            DefaultEntityFactory.make(&EntityKind::new("foo"), Some("x".to_string()), fields);
        assert_eq!(entity.id(), Some("x"));
        assert_eq!(entity.get("a"), Some(&FieldValue::from(1)));
    }
}
