//! Entity kinds: the closed set of gateway object categories.
//!
//! A kind is both the dispatch key into the rule table and the namespace at
//! the front of every reference key.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

/// A category of platform object.
///
/// `Display` renders the reference-key namespace (`VoiceState`); serde uses
/// the lowercase cache name (`voicestate`). `FromStr` accepts either,
/// ignoring case.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum EntityKind {
  AutoModRule,
  Channel,
  Guild,
  Emoji,
  Sticker,
  Member,
  Role,
  Event,
  Integration,
  Invite,
  Message,
  Reaction,
  Stage,
  VoiceState,
  Presence,
  User,
}

impl EntityKind {
  /// The lowercase name of this kind's cache bucket.
  pub fn cache_name(&self) -> &'static str {
    match self {
      Self::AutoModRule => "automodrule",
      Self::Channel => "channel",
      Self::Guild => "guild",
      Self::Emoji => "emoji",
      Self::Sticker => "sticker",
      Self::Member => "member",
      Self::Role => "role",
      Self::Event => "event",
      Self::Integration => "integration",
      Self::Invite => "invite",
      Self::Message => "message",
      Self::Reaction => "reaction",
      Self::Stage => "stage",
      Self::VoiceState => "voicestate",
      Self::Presence => "presence",
      Self::User => "user",
    }
  }

  /// The namespace written at the front of reference keys.
  pub fn namespace(&self) -> &'static str { (*self).into() }

  /// Parse a kind from its namespace or cache name, ignoring case.
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s.trim())
      .map_err(|_| Error::UnknownEntityKind(s.to_string()))
  }
}
