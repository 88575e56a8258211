//! Property-based tests for the deduplication engine.
//!
//! Payloads are generated from field names the rule table cares about, so
//! rules fire, fail, and skip in every combination:
//! - Passthrough: kinds without rules return the payload untouched
//! - Determinism: the same input always yields the same output
//! - Idempotence: a second pass over the output changes nothing
//! - Removal: every rewritten field is gone from the output

use dedupe_core::{DEDUPE_FIELD, EntityKind, deduplicate, rules_for};
use proptest::prelude::*;
use serde_json::{Map, Value};
use strum::IntoEnumIterator;

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn field_name_strategy() -> impl Strategy<Value = String> {
  prop_oneof![
    prop::sample::select(vec![
      "id", "guild_id", "channel_id", "message_id", "user_id", "user",
      "author", "member", "mentions", "reactions", "emoji", "roles",
      "members", "emojis", "voice_states", "inviter", "creator",
    ])
    .prop_map(String::from),
    "[a-z_]{1,8}".prop_filter("reserved", |s| s != DEDUPE_FIELD),
  ]
}

fn json_strategy() -> impl Strategy<Value = Value> {
  let leaf = prop_oneof![
    Just(Value::Null),
    any::<bool>().prop_map(Value::from),
    any::<i64>().prop_map(Value::from),
    "[a-z0-9]{0,6}".prop_map(Value::from),
  ];
  leaf.prop_recursive(3, 48, 5, |inner| {
    prop_oneof![
      prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
      prop::collection::btree_map(field_name_strategy(), inner, 0..5)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
    ]
  })
}

fn payload_strategy() -> impl Strategy<Value = Value> {
  prop::collection::btree_map(field_name_strategy(), json_strategy(), 0..8)
    .prop_map(|m| Value::Object(m.into_iter().collect()))
}

fn kind_strategy() -> impl Strategy<Value = EntityKind> {
  prop::sample::select(EntityKind::iter().collect::<Vec<_>>())
}

// =============================================================================
// ENGINE PROPERTIES
// =============================================================================

proptest! {
  /// Kinds without rules return exactly the input.
  #[test]
  fn rule_free_kinds_are_identity(
    payload in payload_strategy(),
    kind in kind_strategy(),
  ) {
    prop_assume!(rules_for(kind).is_empty());
    prop_assert_eq!(deduplicate(kind, &payload), payload);
  }

  /// Two calls on the same input serialise identically.
  #[test]
  fn output_is_deterministic(
    payload in payload_strategy(),
    kind in kind_strategy(),
  ) {
    let a = serde_json::to_string(&deduplicate(kind, &payload)).unwrap();
    let b = serde_json::to_string(&deduplicate(kind, &payload)).unwrap();
    prop_assert_eq!(a, b);
  }

  /// Running the engine over its own output changes nothing.
  #[test]
  fn second_pass_is_a_no_op(
    payload in payload_strategy(),
    kind in kind_strategy(),
  ) {
    let once = deduplicate(kind, &payload);
    let twice = deduplicate(kind, &once);
    prop_assert_eq!(once, twice);
  }

  /// Every field named in `dedupe` is absent from the rest of the output,
  /// and every other input field survives unchanged.
  #[test]
  fn rewritten_fields_are_removed(
    payload in payload_strategy(),
    kind in kind_strategy(),
  ) {
    prop_assume!(!rules_for(kind).is_empty());
    let out = deduplicate(kind, &payload);
    let dedupe = out[DEDUPE_FIELD].as_object().cloned().unwrap_or_default();

    for field in dedupe.keys() {
      prop_assert!(out.get(field).is_none(), "{} still present", field);
    }
    for (field, value) in payload.as_object().unwrap() {
      if !dedupe.contains_key(field) {
        prop_assert_eq!(out.get(field), Some(value));
      }
    }
  }
}
