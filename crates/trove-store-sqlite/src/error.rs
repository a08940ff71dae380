//! Error type for `trove-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] trove_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// The liveness query answered, but not with the expected value.
  #[error("liveness query returned {0}, expected 1")]
  UnexpectedProbe(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
