//! Error types for `trove-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unparseable event date {value:?}")]
  DateParse { value: String },

  /// A warehouse handle was asked to load records before its tables were
  /// ensured.
  #[error("load_records called before ensure_schema")]
  SchemaNotReady,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
