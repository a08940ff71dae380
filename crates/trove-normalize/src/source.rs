//! Reading the raw Parquet snapshot.

use std::{fs::File, path::Path};

use parquet::file::reader::{FileReader, SerializedFileReader};
use trove_core::event::RawEvent;

use crate::{Error, Result};

/// Read every row of the Parquet file at `path` as a [`RawEvent`].
///
/// Rows are rendered to JSON objects (nested groups become nested objects,
/// lists become arrays) and deserialized against the raw event schema. Any
/// failure aborts the load; no partial dataset is returned.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<RawEvent>> {
  let path = path.as_ref();
  let reader = SerializedFileReader::new(File::open(path)?)?;

  let expected = reader.metadata().file_metadata().num_rows();
  let mut events = Vec::with_capacity(usize::try_from(expected).unwrap_or_default());

  for (index, row) in reader.get_row_iter(None)?.enumerate() {
    let value = row?.to_json_value();
    let event = serde_json::from_value(value).map_err(|source| Error::Row { index, source })?;
    events.push(event);
  }

  tracing::info!(path = %path.display(), rows = events.len(), "read snapshot");
  Ok(events)
}
