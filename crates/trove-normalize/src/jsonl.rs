//! The intermediate file: one JSON object per normalized event, per line.

use std::{
  fs::{self, File},
  io::{BufRead, BufReader, BufWriter, Write},
  path::Path,
};

use trove_core::event::NormalizedEvent;

use crate::{Error, Result};

/// Write `events` to `path`, replacing any existing file.
///
/// Parent directories are created as needed. Returns the number of lines
/// written.
pub fn write(path: impl AsRef<Path>, events: &[NormalizedEvent]) -> Result<usize> {
  let path = path.as_ref();
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent)?;
  }

  let mut out = BufWriter::new(File::create(path)?);
  for event in events {
    serde_json::to_writer(&mut out, event)?;
    out.write_all(b"\n")?;
  }
  out.flush()?;

  tracing::info!(path = %path.display(), lines = events.len(), "wrote intermediate file");
  Ok(events.len())
}

/// Read every event back from a file produced by [`write`].
///
/// Blank lines are skipped; a malformed line fails the whole read.
pub fn read(path: impl AsRef<Path>) -> Result<Vec<NormalizedEvent>> {
  let path = path.as_ref();
  let reader = BufReader::new(File::open(path)?);

  let mut events = Vec::new();
  for (n, line) in reader.lines().enumerate() {
    let line = line?;
    if line.trim().is_empty() {
      continue;
    }
    let event = serde_json::from_str(&line).map_err(|source| Error::JsonLine { line: n + 1, source })?;
    events.push(event);
  }

  tracing::info!(path = %path.display(), lines = events.len(), "read intermediate file");
  Ok(events)
}
