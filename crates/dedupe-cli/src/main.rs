//! `dedupe`: rewrite nested gateway entities into cache reference keys.
//!
//! Reads newline-delimited JSON from a file or stdin and writes one
//! transformed payload per line to stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```text
//! dedupe events.ndjson
//! dedupe --kind message < messages.ndjson
//! DEDUPE_KINDS=guild,message dedupe --config dedupe.toml events.ndjson
//! ```
//!
//! Without `--kind`, each line is an envelope:
//! `{"kind": "guild", "payload": { ... }}`.

mod input;

use std::{
  fs::File,
  io::{self, BufRead, BufReader, BufWriter, Write},
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::Parser;
use dedupe_core::{DedupeConfig, Deduplicator, EntityKind};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
  author,
  version,
  about = "Rewrite nested gateway entities into cache reference keys"
)]
struct Cli {
  /// NDJSON input file. Reads stdin when omitted or `-`.
  input: Option<PathBuf>,

  /// Treat every line as a raw payload of this kind instead of an envelope.
  #[arg(short, long, value_parser = EntityKind::parse)]
  kind: Option<EntityKind>,

  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "dedupe.toml")]
  config: PathBuf,

  /// Pretty-print each output payload.
  #[arg(long)]
  pretty: bool,
}

fn main() -> anyhow::Result<()> {
  // Initialise tracing on stderr; stdout carries the output payloads.
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let dedupe_cfg = load_config(&cli.config)?;
  let dedup = Deduplicator::from_config(&dedupe_cfg);
  tracing::debug!(
    kinds = ?dedup.enabled().collect::<Vec<_>>(),
    "deduplicator configured"
  );

  let reader = open_input(cli.input.as_deref())?;
  let stdout = io::stdout();
  let mut writer = BufWriter::new(stdout.lock());

  let summary = input::run(&dedup, cli.kind, reader, &mut writer, cli.pretty)?;
  writer.flush().context("failed to flush output")?;

  tracing::info!(
    processed = summary.processed,
    skipped = summary.skipped,
    degraded = summary.degraded,
    failures = summary.failures,
    "finished"
  );

  Ok(())
}

/// Load configuration: the optional TOML file at `path`, then `DEDUPE_*`
/// environment overrides.
fn load_config(path: &Path) -> anyhow::Result<DedupeConfig> {
  load_config_from(path, None)
}

/// As [`load_config`], reading overrides from `env` instead of the process
/// environment when given.
fn load_config_from(
  path: &Path,
  env: Option<config::Map<String, String>>,
) -> anyhow::Result<DedupeConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix("DEDUPE")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("kinds")
        .source(env),
    )
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise DedupeConfig")
}

/// Open `path` for line reading, or stdin for `None` and `-`.
fn open_input(path: Option<&Path>) -> anyhow::Result<Box<dyn BufRead>> {
  match path {
    None => Ok(Box::new(io::stdin().lock())),
    Some(p) if p == Path::new("-") => Ok(Box::new(io::stdin().lock())),
    Some(p) => {
      let file = File::open(p)
        .with_context(|| format!("failed to open input {}", p.display()))?;
      Ok(Box::new(BufReader::new(file)))
    }
  }
}
