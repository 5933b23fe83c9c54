//! Value codec between entity fields and SimpleDB attributes.
//!
//! SimpleDB stores every attribute as a string. On write, booleans, dates,
//! nulls and nested structures are turned into their JSON text; numbers and
//! strings pass through as they are. No type tag is stored, so on read each
//! string is inspected and reinterpreted by pattern:
//!
//! 1. `"true"` / `"false"` become booleans.
//! 2. Anything containing `<digits>-<digits>-<digits>T` is parsed as a date.
//! 3. Anything bracketed like a JSON object or array is parsed as JSON.
//!
//! The checks run in that order and a later successful check overrides an
//! earlier one. A value that fails to parse is kept as the raw string. This
//! means a plain string that happens to look like one of these forms comes
//! back reinterpreted.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::Value;

use crate::types::{Entity, FieldValue};

use super::client::Attributes;

/// Attribute holding the entity id alongside the item name.
pub const ID_ATTRIBUTE: &str = "id";

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+-\d+-\d+T").expect("valid date pattern"));

static STRUCTURED_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\{\[].*[\}\]]$").expect("valid structure pattern"));

static LEADING_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^["\s]+"#).expect("valid leading pattern"));

static TRAILING_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["\s+]$"#).expect("valid trailing pattern"));

/// Encodes a single field value into its attribute form.
pub fn encode_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(s) => Value::String(s.clone()),
        FieldValue::Number(n) => Value::Number(n.clone()),
        FieldValue::Bool(_)
        | FieldValue::Null
        | FieldValue::Date(_)
        | FieldValue::Structured(_) => Value::String(value.to_json().to_string()),
    }
}

/// Encodes every field of `entity` plus its id into an attribute map.
pub fn encode_entity(entity: &Entity, id: &str) -> Attributes {
    let mut attributes: Attributes = entity
        .fields()
        .map(|(name, value)| (name.to_string(), encode_value(value)))
        .collect();
    attributes.insert(ID_ATTRIBUTE.to_string(), Value::String(id.to_string()));
    attributes
}

/// Decodes a single attribute value.
///
/// Non-string values are converted without inspection.
pub fn decode_value(value: Value) -> FieldValue {
    match value {
        Value::String(raw) => decode_text(raw),
        other => FieldValue::from_json(other),
    }
}

fn decode_text(raw: String) -> FieldValue {
    let mut decoded = None;

    if raw == "true" {
        decoded = Some(FieldValue::Bool(true));
    }
    if raw == "false" {
        decoded = Some(FieldValue::Bool(false));
    }

    if DATE_PATTERN.is_match(&raw) {
        if let Some(date) = parse_date(&raw) {
            decoded = Some(FieldValue::Date(date));
        }
    }

    if STRUCTURED_PATTERN.is_match(&raw) {
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => decoded = Some(FieldValue::from_json(value)),
            Err(e) => tracing::trace!("keeping bracketed value as text: {}", e),
        }
    }

    decoded.unwrap_or(FieldValue::Text(raw))
}

/// Parses a stored date, tolerating the JSON quotes it is written with.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = LEADING_NOISE.replace(raw, "");
    let trimmed = TRAILING_NOISE.replace(&trimmed, "");

    if let Ok(date) = DateTime::parse_from_rfc3339(&trimmed) {
        return Some(date.with_timezone(&Utc));
    }

    // Signed years outside 0000-9999, e.g. `+10000-01-01T00:00:00Z`.
    if let Ok(date) = trimmed.parse::<DateTime<Utc>>() {
        return Some(date);
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&trimmed, format).ok())
        .map(|naive| naive.and_utc())
}

/// Decodes an attribute map into an id and entity fields.
///
/// The `id` attribute is taken as-is and never pattern-decoded.
pub fn decode_attributes(
    mut attributes: Attributes,
) -> (Option<String>, BTreeMap<String, FieldValue>) {
    let id = attributes.remove(ID_ATTRIBUTE).and_then(|value| match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });

    let fields = attributes
        .into_iter()
        .map(|(name, value)| (name, decode_value(value)))
        .collect();

    (id, fields)
}
