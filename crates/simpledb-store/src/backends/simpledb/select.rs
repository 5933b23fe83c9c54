//! Translation of equality queries into SimpleDB select expressions.
//!
//! A [`Query`] such as `{ p1: "v1", p2: 2 }` against domain `foo` becomes
//!
//! ```text
//! select * from `foo` where p1="v1" and p2="2"
//! ```
//!
//! Every interpolated string (domain, attribute names, values) is escaped
//! with [`escape`]. Values are rendered as the text they are stored as, so a
//! filter on a boolean or structured field matches what `save` wrote.

use serde_json::Value;

use crate::types::{FieldValue, Query};

use super::codec::encode_value;

/// Backslash-escapes characters that could break out of a quoted literal.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\0' => out.push_str("\\0"),
            '\x08' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\x1a' => out.push_str("\\z"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '"' | '\'' | '\\' | '%' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Builds the select expression for `query` over `domain`.
///
/// An empty query selects the whole domain. The `all` flag is ignored here.
pub fn build_select(domain: &str, query: &Query) -> String {
    let base = format!("select * from `{}`", escape(domain));
    if query.is_empty() {
        return base;
    }

    let conditions = query
        .filters()
        .iter()
        .map(|(key, value)| format!("{}=\"{}\"", render_key(key), escape(&render_value(value))))
        .collect::<Vec<_>>()
        .join(" and ");

    format!("{} where {}", base, conditions)
}

fn render_key(key: &str) -> String {
    let bare = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if bare {
        key.to_string()
    } else {
        format!("`{}`", escape(key))
    }
}

fn render_value(value: &FieldValue) -> String {
    match encode_value(value) {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
