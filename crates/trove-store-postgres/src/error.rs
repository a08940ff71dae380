//! Error type for `trove-store-postgres`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] trove_core::Error),

  #[error("credentials error: {0}")]
  Credentials(#[from] config::ConfigError),

  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  /// The liveness query answered, but not with the expected value.
  #[error("liveness query returned {0}, expected 1")]
  UnexpectedProbe(i32),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
