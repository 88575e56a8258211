//! NDJSON input handling: one payload (or envelope) per line in, one
//! transformed payload per line out.

use std::io::{BufRead, Write};

use anyhow::Context as _;
use dedupe_core::{Deduplicated, Deduplicator, EntityKind};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// A payload tagged with its kind, used when no `--kind` is given.
#[derive(Debug, Deserialize)]
pub struct Envelope {
  pub kind:    EntityKind,
  pub payload: Value,
}

#[derive(Debug, Error)]
pub enum LineError {
  #[error("invalid JSON: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid envelope: {0}")]
  Envelope(#[source] serde_json::Error),

  #[error("invalid UTF-8: {0}")]
  Utf8(#[from] std::str::Utf8Error),
}

/// Totals reported once the input is exhausted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
  pub processed: usize,
  pub skipped:   usize,
  /// Processed lines with at least one field left inline.
  pub degraded:  usize,
  /// Fields left un-deduplicated across all processed lines.
  pub failures:  usize,
}

/// Decode one line and run it through the engine.
pub fn process_line(
  dedup: &Deduplicator,
  kind: Option<EntityKind>,
  line: &str,
) -> Result<Deduplicated, LineError> {
  let value: Value = serde_json::from_str(line)?;
  let (kind, payload) = match kind {
    Some(kind) => (kind, value),
    None => {
      let envelope: Envelope =
        serde_json::from_value(value).map_err(LineError::Envelope)?;
      (envelope.kind, envelope.payload)
    }
  };
  Ok(dedup.apply(kind, &payload))
}

/// Process every non-blank line of `reader`, writing results to `writer`.
///
/// Lines that cannot be decoded are logged and skipped. Only read and write
/// errors end the run.
pub fn run<R, W>(
  dedup: &Deduplicator,
  kind: Option<EntityKind>,
  reader: R,
  mut writer: W,
  pretty: bool,
) -> anyhow::Result<Summary>
where
  R: BufRead,
  W: Write,
{
  let mut summary = Summary::default();

  for (index, line) in (1usize..).zip(reader.split(b'\n')) {
    let mut bytes = line.context("failed to read input")?;
    if bytes.last() == Some(&b'\r') {
      bytes.pop();
    }

    let decoded = std::str::from_utf8(&bytes).map_err(LineError::from);
    if matches!(&decoded, Ok(l) if l.trim().is_empty()) {
      continue;
    }

    match decoded.and_then(|l| process_line(dedup, kind, l)) {
      Ok(result) => {
        summary.processed += 1;
        summary.failures += result.failures.len();
        if !result.is_clean() {
          summary.degraded += 1;
        }
        if pretty {
          serde_json::to_writer_pretty(&mut writer, &result.payload)?;
        } else {
          serde_json::to_writer(&mut writer, &result.payload)?;
        }
        writer.write_all(b"\n").context("failed to write output")?;
      }
      Err(e) => {
        summary.skipped += 1;
        tracing::warn!(line = index, error = %e, "skipping input line");
      }
    }
  }

  Ok(summary)
}
