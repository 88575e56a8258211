//! Reference keys: `Kind:seg1:seg2:...` strings that point into the cache.
//!
//! Prefix segments come first, read from the outer payload, followed by key
//! segments read from the nested object. The same inputs always yield the
//! same key.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
  Error, Result,
  kind::EntityKind,
  path,
  rules::FieldRule,
};

/// Separator between the namespace and each segment.
pub const SEPARATOR: char = ':';

// ─── ReferenceKey ────────────────────────────────────────────────────────────

/// A rendered reference key.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ReferenceKey(String);

impl ReferenceKey {
  pub fn as_str(&self) -> &str { &self.0 }

  /// The leading namespace, e.g. `Member` for `Member:g1:u1`.
  pub fn namespace(&self) -> &str {
    self.0.split(SEPARATOR).next().unwrap_or_default()
  }

  /// The entity kind named by the namespace.
  pub fn kind(&self) -> Result<EntityKind> {
    EntityKind::parse(self.namespace())
  }

  /// Segments after the namespace, in order.
  pub fn segments(&self) -> impl Iterator<Item = &str> {
    self.0.split(SEPARATOR).skip(1)
  }
}

impl fmt::Display for ReferenceKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<ReferenceKey> for Value {
  fn from(key: ReferenceKey) -> Self { Value::String(key.0) }
}

// ─── Scope ───────────────────────────────────────────────────────────────────

/// Where prefix paths are resolved: the payload containing the nested object.
pub trait Scope {
  fn lookup(&self, path: &str) -> Option<&Value>;
}

impl Scope for Value {
  fn lookup(&self, path: &str) -> Option<&Value> { path::resolve(self, path) }
}

impl Scope for Map<String, Value> {
  fn lookup(&self, path: &str) -> Option<&Value> {
    path::resolve_in(self, path)
  }
}

// ─── Computation ─────────────────────────────────────────────────────────────

/// Compute the reference key for one `nested` object under `rule`, reading
/// prefix context from `outer`.
pub fn reference_key<S>(
  rule: &FieldRule,
  nested: &Value,
  outer: &S,
) -> Result<ReferenceKey>
where
  S: Scope + ?Sized,
{
  let mut key = String::from(rule.target.namespace());

  for prefix in rule.prefixes {
    let resolved = match outer.lookup(prefix.path) {
      Some(value) => path::segment(value, prefix.path)?,
      None => None,
    };
    let value = match (resolved, prefix.fallback) {
      (Some(value), _) => value,
      (None, Some(fallback)) => fallback.to_string(),
      (None, None) => {
        return Err(Error::MissingPrefix { path: prefix.path.to_string() });
      }
    };
    push_segment(&mut key, &value);
  }

  for key_path in rule.key_paths {
    let value = path::resolve(nested, key_path)
      .map(|v| path::segment(v, key_path))
      .transpose()?
      .flatten()
      .ok_or_else(|| Error::MissingKey { path: key_path.to_string() })?;
    push_segment(&mut key, &value);
  }

  Ok(ReferenceKey(key))
}

fn push_segment(key: &mut String, segment: &str) {
  key.push(SEPARATOR);
  key.push_str(segment);
}
