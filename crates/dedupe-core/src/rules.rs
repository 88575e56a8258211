//! The rule table: which nested fields of each entity kind are rewritten
//! into reference keys, and how those keys are built.
//!
//! The table is plain `static` data. It is never mutated and needs no
//! initialisation, so it is safe to read from any thread.

use crate::kind::EntityKind;

// ─── Rule types ──────────────────────────────────────────────────────────────

/// A value read from the outer payload and prepended to a reference key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixRule {
  /// Dotted path relative to the outer (containing) payload.
  pub path:     &'static str,
  /// Literal used when `path` resolves to nothing. Without one, a missing
  /// value fails the rule.
  pub fallback: Option<&'static str>,
}

impl PrefixRule {
  pub const fn required(path: &'static str) -> Self {
    Self { path, fallback: None }
  }

  pub const fn or(path: &'static str, fallback: &'static str) -> Self {
    Self { path, fallback: Some(fallback) }
  }
}

/// How to rewrite one field of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
  /// Kind of the object (or objects) stored at `field`.
  pub target:    EntityKind,
  /// Top-level key holding a nested object or an array of them.
  pub field:     &'static str,
  /// Paths read off each nested object, one key segment each.
  pub key_paths: &'static [&'static str],
  /// Context read off the outer payload, prepended before the key paths.
  pub prefixes:  &'static [PrefixRule],
}

impl FieldRule {
  const fn new(
    target: EntityKind,
    field: &'static str,
    key_paths: &'static [&'static str],
    prefixes: &'static [PrefixRule],
  ) -> Self {
    Self { target, field, key_paths, prefixes }
  }
}

// ─── Table ───────────────────────────────────────────────────────────────────

use EntityKind as K;
use PrefixRule as P;

const GUILD_OR_DM: P = P::or("guild_id", "dm");

static USER: &[FieldRule] = &[FieldRule::new(K::User, "user", &["id"], &[])];

static EVENT: &[FieldRule] =
  &[FieldRule::new(K::User, "creator", &["id"], &[])];

static INVITE: &[FieldRule] = &[
  FieldRule::new(K::User, "inviter", &["id"], &[]),
  FieldRule::new(K::User, "target_user", &["id"], &[]),
];

static VOICE_STATE: &[FieldRule] =
  &[FieldRule::new(K::Member, "member", &["user.id"], &[GUILD_OR_DM])];

static GUILD: &[FieldRule] = &[
  FieldRule::new(
    K::VoiceState,
    "voice_states",
    &["channel_id", "user_id"],
    &[],
  ),
  FieldRule::new(K::Member, "members", &["user.id"], &[P::required("id")]),
  FieldRule::new(K::Channel, "channels", &["id"], &[P::required("id")]),
  FieldRule::new(K::Channel, "threads", &["id"], &[P::required("id")]),
  FieldRule::new(K::Presence, "presences", &["user.id"], &[P::required("id")]),
  FieldRule::new(K::Stage, "stage_instances", &["guild_id", "id"], &[]),
  FieldRule::new(K::Event, "guild_scheduled_events", &["guild_id", "id"], &[]),
  FieldRule::new(K::Role, "roles", &["id"], &[P::required("id")]),
  FieldRule::new(K::Emoji, "emojis", &["id"], &[]),
  FieldRule::new(K::Sticker, "stickers", &["id"], &[]),
];

// `member` must run before `author`: its key is scoped by `author.id`, which
// is no longer visible once `author` has been replaced.
static MESSAGE: &[FieldRule] = &[
  FieldRule::new(K::Member, "member", &[], &[
    GUILD_OR_DM,
    P::required("author.id"),
  ]),
  FieldRule::new(K::User, "author", &["id"], &[]),
  FieldRule::new(K::User, "mentions", &["id"], &[]),
  FieldRule::new(K::Role, "mention_roles", &["id"], &[P::required("guild_id")]),
  FieldRule::new(K::Channel, "mention_channels", &["id"], &[GUILD_OR_DM]),
  FieldRule::new(K::Reaction, "reactions", &["emoji.id"], &[
    GUILD_OR_DM,
    P::required("channel_id"),
    P::required("message_id"),
  ]),
  FieldRule::new(K::Message, "referenced_message", &["id"], &[
    GUILD_OR_DM,
    P::required("channel_id"),
  ]),
  FieldRule::new(K::Channel, "thread", &["id"], &[GUILD_OR_DM]),
  FieldRule::new(K::Sticker, "sticker_items", &["id"], &[]),
];

/// The rules applied to payloads of `kind`, in order.
///
/// Leaf kinds, which never embed other entities, have no rules.
pub fn rules_for(kind: EntityKind) -> &'static [FieldRule] {
  match kind {
    K::Channel | K::Member | K::Integration | K::Presence => USER,
    K::Event => EVENT,
    K::Invite => INVITE,
    K::VoiceState => VOICE_STATE,
    K::Guild => GUILD,
    K::Message => MESSAGE,
    K::AutoModRule
    | K::Sticker
    | K::Emoji
    | K::Role
    | K::Stage
    | K::User
    | K::Reaction => &[],
  }
}
