//! Reference-key deduplication for gateway entity payloads.
//!
//! Gateway events embed whole sub-entities (the author of a message, every
//! member of a guild, ...). This crate rewrites those nested objects into
//! reference keys such as `Member:g1:u1` so each entity can live once in a
//! central cache. Pure synchronous; no I/O dependencies.
//!
//! # Quick start
//!
//! ```
//! use dedupe_core::{EntityKind, deduplicate};
//! use serde_json::json;
//!
//! let guild = json!({
//!   "id": "g1",
//!   "roles": [{ "id": "r1" }],
//!   "emojis": [{ "id": "e1" }],
//! });
//! let out = deduplicate(EntityKind::Guild, &guild);
//! assert_eq!(out["dedupe"]["roles"], json!(["Role:g1:r1"]));
//! assert_eq!(out["dedupe"]["emojis"], json!(["Emoji:e1"]));
//! assert!(out.get("roles").is_none());
//! ```

pub mod engine;
pub mod error;
pub mod key;
pub mod kind;
pub mod path;
pub mod rules;

pub use engine::{
  DEDUPE_FIELD, DedupeConfig, Deduplicated, Deduplicator, FieldFailure,
  deduplicate,
};
pub use error::{Error, Result};
pub use key::{ReferenceKey, Scope, reference_key};
pub use kind::EntityKind;
pub use rules::{FieldRule, PrefixRule, rules_for};
