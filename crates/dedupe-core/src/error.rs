//! Error types for `dedupe-core`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// A prefix path with no fallback resolved to nothing on the outer payload.
  #[error("no value for prefix path {path:?} in the outer payload")]
  MissingPrefix { path: String },

  /// A key path resolved to nothing on the nested object.
  #[error("no value for key path {path:?} in the nested object")]
  MissingKey { path: String },

  /// The path resolved to an object or array, which cannot form a segment.
  #[error("value at {path:?} is not a scalar")]
  NonScalarSegment { path: String },

  #[error("unknown entity kind: {0:?}")]
  UnknownEntityKind(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
