//! Helpers over the layout JSON tree.
//!
//! Several layout fields hold JSON documents serialized as strings. The
//! helpers here accept both forms.

use serde_json::{Map, Value};

use super::error::{LayoutError, LayoutResult};

/// Decode a possibly string-encoded sub-document.
pub(crate) fn decode_embedded(value: &Value, field: &'static str, context: &str) -> LayoutResult<Value> {
    match value {
        Value::String(text) => {
            serde_json::from_str(text).map_err(|source| LayoutError::EmbeddedDocument {
                context: context.to_string(),
                field,
                source,
            })
        }
        other => Ok(other.clone()),
    }
}

/// Every object stored under `key` anywhere below `value`.
///
/// A matched object is not searched further, and structurally equal
/// matches are returned once.
pub(crate) fn find_objects_by_key<'a>(value: &'a Value, key: &str) -> Vec<&'a Map<String, Value>> {
    let mut found = Vec::new();
    collect_objects(value, key, &mut found);
    found
}

fn collect_objects<'a>(value: &'a Value, key: &str, found: &mut Vec<&'a Map<String, Value>>) {
    match value {
        Value::Object(map) => {
            for (k, child) in map {
                match child {
                    Value::Object(matched) if k == key => {
                        if !found.iter().any(|existing| *existing == matched) {
                            found.push(matched);
                        }
                    }
                    _ => collect_objects(child, key, found),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_objects(item, key, found);
            }
        }
        _ => {}
    }
}

/// Text of a scalar: strings verbatim, anything else as JSON.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Follow `path` through nested objects.
pub(crate) fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}
