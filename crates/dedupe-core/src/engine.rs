//! The deduplication engine.
//!
//! Applies the rules for an entity kind to a payload and assembles a fresh
//! output: every original field except the replaced ones, plus a `dedupe`
//! map from field name to reference key (or ordered array of keys). The
//! caller's payload is only ever borrowed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::IntoEnumIterator;

use crate::{
  Error, Result,
  key::{Scope, reference_key},
  kind::EntityKind,
  path,
  rules::{FieldRule, rules_for},
};

/// Name of the field that carries the reference keys in the output.
pub const DEDUPE_FIELD: &str = "dedupe";

// ─── Configuration ───────────────────────────────────────────────────────────

/// Engine configuration, usually deserialised from the `dedupe.toml` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupeConfig {
  /// Kinds whose payloads are rewritten. `None` enables every kind.
  #[serde(default)]
  pub kinds: Option<Vec<EntityKind>>,
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// A rule that could not be applied. The field's nested data was left in
/// the output untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
  pub entity: EntityKind,
  pub field:  &'static str,
  pub error:  Error,
}

/// The transformed payload together with any contained failures.
#[derive(Debug, Clone, PartialEq)]
pub struct Deduplicated {
  pub payload:  Value,
  pub failures: Vec<FieldFailure>,
}

impl Deduplicated {
  fn unchanged(payload: &Value) -> Self {
    Self { payload: payload.clone(), failures: Vec::new() }
  }

  /// True when every applicable rule succeeded.
  pub fn is_clean(&self) -> bool { self.failures.is_empty() }
}

// ─── Deduplicator ────────────────────────────────────────────────────────────

/// Rewrites nested entities into reference keys for the enabled kinds.
///
/// Holds no per-call state, so one instance can be shared across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deduplicator {
  enabled: BTreeSet<EntityKind>,
}

impl Default for Deduplicator {
  fn default() -> Self { Self::all() }
}

impl Deduplicator {
  /// Only payloads of `kinds` are rewritten; everything else passes through.
  pub fn new(kinds: impl IntoIterator<Item = EntityKind>) -> Self {
    Self { enabled: kinds.into_iter().collect() }
  }

  /// Every kind enabled.
  pub fn all() -> Self { Self::new(EntityKind::iter()) }

  pub fn from_config(config: &DedupeConfig) -> Self {
    match &config.kinds {
      Some(kinds) => Self::new(kinds.iter().copied()),
      None => Self::all(),
    }
  }

  pub fn is_enabled(&self, kind: EntityKind) -> bool {
    self.enabled.contains(&kind)
  }

  pub fn enabled(&self) -> impl Iterator<Item = EntityKind> + '_ {
    self.enabled.iter().copied()
  }

  /// Rewrite `payload` and return only the transformed value.
  pub fn deduplicate(&self, kind: EntityKind, payload: &Value) -> Value {
    self.apply(kind, payload).payload
  }

  /// Rewrite `payload`, reporting every rule that had to be skipped.
  pub fn apply(&self, kind: EntityKind, payload: &Value) -> Deduplicated {
    let rules = rules_for(kind);
    if rules.is_empty() || !self.is_enabled(kind) {
      tracing::debug!(entity = %kind, "passing payload through unchanged");
      return Deduplicated::unchanged(payload);
    }
    let Some(fields) = payload.as_object() else {
      tracing::debug!(entity = %kind, "non-object payload; passing through");
      return Deduplicated::unchanged(payload);
    };

    // Entries from an earlier pass are kept so a second pass is a no-op.
    let mut dedupe = match fields.get(DEDUPE_FIELD) {
      Some(Value::Object(previous)) => previous.clone(),
      _ => Map::new(),
    };
    let mut replaced: Vec<&'static str> = Vec::with_capacity(rules.len());
    let mut failures = Vec::new();

    for rule in rules {
      let Some(value) = fields.get(rule.field).filter(|v| !is_empty(v)) else {
        continue;
      };
      let outer = Processed { fields, replaced: &replaced };
      match rewrite(rule, value, &outer) {
        Ok(entry) => {
          dedupe.insert(rule.field.to_string(), entry);
          replaced.push(rule.field);
        }
        Err(error) => {
          tracing::warn!(
            entity = %kind,
            field = rule.field,
            target = %rule.target,
            %error,
            "failed to deduplicate field; leaving nested data in place"
          );
          failures.push(FieldFailure {
            entity: kind,
            field: rule.field,
            error,
          });
        }
      }
    }

    let mut output = Map::new();
    for (name, value) in fields {
      if name == DEDUPE_FIELD || replaced.iter().any(|f| *f == name.as_str()) {
        continue;
      }
      output.insert(name.clone(), value.clone());
    }
    output.insert(DEDUPE_FIELD.to_string(), Value::Object(dedupe));

    Deduplicated { payload: Value::Object(output), failures }
  }
}

/// Rewrite `payload` with every kind enabled.
pub fn deduplicate(kind: EntityKind, payload: &Value) -> Value {
  Deduplicator::all().deduplicate(kind, payload)
}

// ─── Internals ───────────────────────────────────────────────────────────────

/// The outer payload as seen by later rules: fields already replaced, and
/// the `dedupe` map itself, are no longer visible.
struct Processed<'a> {
  fields:   &'a Map<String, Value>,
  replaced: &'a [&'static str],
}

impl Scope for Processed<'_> {
  fn lookup(&self, path: &str) -> Option<&Value> {
    let head = path.split('.').next().unwrap_or(path);
    if head == DEDUPE_FIELD || self.replaced.iter().any(|f| *f == head) {
      return None;
    }
    path::resolve_in(self.fields, path)
  }
}

/// An absent field: `null` or an empty string. Rules skip these silently.
fn is_empty(value: &Value) -> bool {
  match value {
    Value::Null => true,
    Value::String(s) => s.is_empty(),
    _ => false,
  }
}

/// One key for an object, one key per element for an array. Any element
/// failing fails the whole field.
fn rewrite<S: Scope>(
  rule: &FieldRule,
  value: &Value,
  outer: &S,
) -> Result<Value> {
  match value {
    Value::Array(items) => items
      .iter()
      .map(|item| reference_key(rule, item, outer).map(Value::from))
      .collect::<Result<Vec<_>>>()
      .map(Value::Array),
    nested => reference_key(rule, nested, outer).map(Value::from),
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn processed_scope_hides_replaced_fields() {
    let payload =
      json!({ "id": "g1", "author": { "id": "u1" }, "dedupe": {} });
    let fields = payload.as_object().unwrap();
    let replaced = ["author"];
    let scope = Processed { fields, replaced: &replaced };

    assert_eq!(scope.lookup("id"), Some(&json!("g1")));
    assert_eq!(scope.lookup("author.id"), None);
    assert_eq!(scope.lookup("dedupe"), None);
  }

  #[test]
  fn config_without_kinds_enables_everything() {
    let d = Deduplicator::from_config(&DedupeConfig::default());
    assert_eq!(d, Deduplicator::all());
    assert!(EntityKind::iter().all(|k| d.is_enabled(k)));
  }

  #[test]
  fn config_with_kinds_restricts_the_set() {
    let config = DedupeConfig {
      kinds: Some(vec![EntityKind::Guild, EntityKind::Message]),
    };
    let d = Deduplicator::from_config(&config);
    assert_eq!(d.enabled().collect::<Vec<_>>(), [
      EntityKind::Guild,
      EntityKind::Message
    ]);
    assert!(!d.is_enabled(EntityKind::VoiceState));
  }

  #[test]
  fn config_deserialises_cache_names() {
    let config: DedupeConfig =
      serde_json::from_value(json!({ "kinds": ["guild", "voicestate"] }))
        .unwrap();
    assert_eq!(
      config.kinds,
      Some(vec![EntityKind::Guild, EntityKind::VoiceState])
    );
  }
}
