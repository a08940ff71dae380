//! The Trove ETL driver.
//!
//! Wires configuration to the two stages: `normalize` turns the Parquet
//! snapshot into the JSON-lines intermediate file, and `load` pushes that
//! file into the configured warehouse.

use std::{
  fs,
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use serde::Deserialize;
use trove_core::{
  event::NormalizedEvent,
  warehouse::{LoadReport, Warehouse},
};
use trove_normalize::{NormalizeStats, jsonl};
use trove_store_postgres::{Credentials, PgWarehouse};
use trove_store_sqlite::SqliteWarehouse;

// ─── Configuration ───────────────────────────────────────────────────────────

const DEFAULT_INPUT_PATH: &str = "files/parquet/homelike_assignment_data.parquet";
const DEFAULT_INTERMEDIATE_PATH: &str = "files/json/homelike_assignment_data.json";
const DEFAULT_SQLITE_PATH: &str = "files/db/warehouse.db";
const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";

/// Which warehouse implementation the load stage writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  Sqlite,
  Postgres,
}

/// Runtime configuration, read from `config.toml` and `TROVE_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct EtlConfig {
  pub input_path:        PathBuf,
  pub intermediate_path: PathBuf,
  pub backend:           Backend,
  pub sqlite_path:       PathBuf,
  pub credentials_path:  PathBuf,
  /// Load at most this many records. Unset loads the whole file.
  #[serde(default)]
  pub load_limit:        Option<usize>,
}

impl EtlConfig {
  /// Layer defaults, the optional file at `path`, and the environment.
  pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
    let mut builder = config::Config::builder()
      .set_default("input_path", DEFAULT_INPUT_PATH)?
      .set_default("intermediate_path", DEFAULT_INTERMEDIATE_PATH)?
      .set_default("backend", "sqlite")?
      .set_default("sqlite_path", DEFAULT_SQLITE_PATH)?
      .set_default("credentials_path", DEFAULT_CREDENTIALS_PATH)?;

    if let Some(path) = path {
      builder = builder.add_source(config::File::from(path).required(false));
    }

    builder
      .add_source(config::Environment::with_prefix("TROVE"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise EtlConfig")
  }
}

// ─── Stages ──────────────────────────────────────────────────────────────────

/// Normalize the snapshot and write the intermediate file.
pub fn normalize_stage(config: &EtlConfig) -> anyhow::Result<NormalizeStats> {
  let normalized = trove_normalize::run(&config.input_path)
    .with_context(|| format!("failed to normalize {:?}", config.input_path))?;

  jsonl::write(&config.intermediate_path, &normalized.events)
    .with_context(|| format!("failed to write {:?}", config.intermediate_path))?;

  Ok(normalized.stats)
}

/// Read the intermediate file and load it into the configured backend.
pub async fn load_from_file(config: &EtlConfig) -> anyhow::Result<LoadReport> {
  let records = jsonl::read(&config.intermediate_path)
    .with_context(|| format!("failed to read {:?}", config.intermediate_path))?;

  match config.backend {
    Backend::Sqlite => {
      if let Some(parent) = config.sqlite_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
          .with_context(|| format!("failed to create {parent:?}"))?;
      }
      load_stage::<SqliteWarehouse>(&config.sqlite_path, &records, config.load_limit).await
    }
    Backend::Postgres => {
      let credentials = Credentials::from_file(&config.credentials_path)
        .with_context(|| format!("failed to read credentials from {:?}", config.credentials_path))?;
      load_stage::<PgWarehouse>(&credentials, &records, config.load_limit).await
    }
  }
}

/// Both stages in sequence.
pub async fn run_pipeline(config: &EtlConfig) -> anyhow::Result<LoadReport> {
  normalize_stage(config)?;
  load_from_file(config).await
}

/// Check, open, ensure the schema, load, and close.
///
/// The connection is closed whether or not loading succeeded. With `limit`
/// set only the first `limit` records are loaded.
pub async fn load_stage<W: Warehouse>(
  target:  &W::Target,
  records: &[NormalizedEvent],
  limit:   Option<usize>,
) -> anyhow::Result<LoadReport> {
  if !W::check_connection(target).await {
    anyhow::bail!("warehouse is unreachable; nothing loaded");
  }

  let records = match limit {
    Some(n) if n < records.len() => {
      tracing::info!(limit = n, total = records.len(), "loading a prefix only");
      &records[..n]
    }
    _ => records,
  };

  let mut warehouse = W::open(target).await.context("failed to open warehouse")?;
  let loaded = load_into(&mut warehouse, records).await;
  let closed = warehouse.close().await;

  let report = loaded?;
  closed.context("failed to close warehouse")?;
  Ok(report)
}

async fn load_into<W: Warehouse>(
  warehouse: &mut W,
  records:   &[NormalizedEvent],
) -> anyhow::Result<LoadReport> {
  warehouse
    .ensure_schema()
    .await
    .context("failed to ensure warehouse schema")?;
  let report = warehouse
    .load_records(records)
    .await
    .context("failed to load records")?;
  Ok(report)
}
