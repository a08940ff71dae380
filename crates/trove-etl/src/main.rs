//! trove ETL binary.
//!
//! Reads `config.toml` (or the path given with `--config`), then runs the
//! normalize stage, the load stage, or both in sequence.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use trove_etl::{EtlConfig, load_from_file, normalize_stage, run_pipeline};

#[derive(Parser)]
#[command(author, version, about = "Trove event ETL")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy, Default)]
enum Command {
  /// Normalize the snapshot, then load it.
  #[default]
  Run,
  /// Write the intermediate file only.
  Normalize,
  /// Load an existing intermediate file.
  Load,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let config = EtlConfig::load(Some(cli.config.as_path())).context("failed to load configuration")?;
  tracing::debug!(?config, "loaded configuration");

  match cli.command.unwrap_or_default() {
    Command::Run => {
      let report = run_pipeline(&config).await?;
      tracing::info!(loaded = report.loaded, failed = report.failed, "pipeline finished");
    }
    Command::Normalize => {
      let stats = normalize_stage(&config)?;
      tracing::info!(kept = stats.loaded - stats.dropped, "normalize finished");
    }
    Command::Load => {
      let report = load_from_file(&config).await?;
      tracing::info!(loaded = report.loaded, failed = report.failed, "load finished");
    }
  }

  Ok(())
}
