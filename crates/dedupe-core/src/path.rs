//! Dotted-path lookups into loosely-typed payloads.
//!
//! Payload shapes vary per entity kind, so lookups operate on
//! [`serde_json::Value`] rather than concrete structs. A path such as
//! `user.id` walks object keys one segment at a time; a decimal segment
//! indexes into an array. Any absent step short-circuits to `None`.

use serde_json::{Map, Value};

use crate::{Error, Result};

/// Resolve `path` against `root`.
///
/// Returns `None` when any segment is absent or the resolved value is
/// `null`.
pub fn resolve<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
  let mut current = root;
  for segment in path.split('.') {
    current = step(current, segment)?;
  }
  (!current.is_null()).then_some(current)
}

/// Resolve `path` against the fields of an object.
pub fn resolve_in<'a>(
  fields: &'a Map<String, Value>,
  path: &str,
) -> Option<&'a Value> {
  let (head, rest) = match path.split_once('.') {
    Some((head, rest)) => (head, Some(rest)),
    None => (path, None),
  };
  let value = fields.get(head)?;
  match rest {
    Some(rest) => resolve(value, rest),
    None => (!value.is_null()).then_some(value),
  }
}

fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
  match value {
    Value::Object(map) => map.get(segment),
    Value::Array(items) => {
      segment.parse::<usize>().ok().and_then(|i| items.get(i))
    }
    _ => None,
  }
}

/// Render a resolved value as one reference-key segment.
///
/// Strings are used verbatim and numbers and booleans use their JSON text.
/// An empty string counts as missing (`Ok(None)`). Objects and arrays are
/// rejected.
pub fn segment(value: &Value, path: &str) -> Result<Option<String>> {
  match value {
    Value::Null => Ok(None),
    Value::String(s) if s.is_empty() => Ok(None),
    Value::String(s) => Ok(Some(s.clone())),
    Value::Number(n) => Ok(Some(n.to_string())),
    Value::Bool(b) => Ok(Some(b.to_string())),
    Value::Object(_) | Value::Array(_) => {
      Err(Error::NonScalarSegment { path: path.to_string() })
    }
  }
}
