//! Timestamp repair: heterogeneous `ts` encodings → canonical text.
//!
//! Detection runs on the stringified raw value, in this order:
//!
//!   empty            → `""` (the row is dropped later)
//!   contains `-`     → ISO parse only; failure is never retried as an epoch
//!   contains `/`     → already canonical, re-validated
//!   anything else    → Unix epoch seconds, UTC

use chrono::{DateTime, NaiveDateTime};
use trove_core::event::{CANONICAL_TS_FORMAT, RawTimestamp};

use crate::{Error, Result};

/// ISO-style layouts, tried in order. `%.f` also matches no fraction.
const ISO_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Layout Parquet timestamp columns take when rendered as text.
const OFFSET_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f %:z";

/// Convert a raw `ts` into `dd/mm/yyyy HH:MM:SS`.
///
/// `Ok("")` means the value was absent. `Err` means it was present but could
/// not be understood.
pub fn normalize_timestamp(raw: Option<&RawTimestamp>) -> Result<String> {
  let value = raw.map(ToString::to_string).unwrap_or_default();
  let value = value.trim();

  if value.is_empty() {
    return Ok(String::new());
  }

  let parsed = if value.contains('-') {
    parse_iso(value)?
  } else if value.contains('/') {
    NaiveDateTime::parse_from_str(value, CANONICAL_TS_FORMAT)
      .map_err(|e| invalid(value, e))?
  } else {
    parse_epoch(value)?
  };

  Ok(parsed.format(CANONICAL_TS_FORMAT).to_string())
}

fn parse_iso(value: &str) -> Result<NaiveDateTime> {
  if let Some(naive) = ISO_FORMATS
    .iter()
    .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
  {
    return Ok(naive);
  }

  DateTime::parse_from_rfc3339(value)
    .or_else(|_| DateTime::parse_from_str(value, OFFSET_FORMAT))
    .map(|dt| dt.naive_utc())
    .map_err(|e| invalid(value, e))
}

fn parse_epoch(value: &str) -> Result<NaiveDateTime> {
  let secs: f64 = value.parse().map_err(|e| invalid(value, e))?;
  if !secs.is_finite() {
    return Err(invalid(value, "not a finite number"));
  }

  let whole = secs.floor();
  let nanos = ((secs - whole) * 1e9).round().min(999_999_999.0) as u32;

  DateTime::from_timestamp(whole as i64, nanos)
    .map(|dt| dt.naive_utc())
    .ok_or_else(|| invalid(value, "epoch out of range"))
}

fn invalid(value: &str, reason: impl ToString) -> Error {
  Error::Timestamp {
    value:  value.to_owned(),
    reason: reason.to_string(),
  }
}
