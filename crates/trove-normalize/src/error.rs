//! Error types for the normalizer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("parquet error: {0}")]
  Parquet(#[from] parquet::errors::ParquetError),

  /// A snapshot row whose columns do not fit the raw event schema.
  #[error("row {index} does not match the event schema: {source}")]
  Row {
    index:  usize,
    #[source]
    source: serde_json::Error,
  },

  #[error("malformed JSON on line {line}: {source}")]
  JsonLine {
    line:   usize,
    #[source]
    source: serde_json::Error,
  },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("malformed params: {0}")]
  MalformedParams(String),

  #[error("unparseable timestamp {value:?}: {reason}")]
  Timestamp { value: String, reason: String },

  #[error("no session known for user agent {0:?}")]
  LookupMiss(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
