//! Event records, the rows that flow through the pipeline.
//!
//! A [`RawEvent`] is one row of the tracking snapshot exactly as read from the
//! columnar file. The normalizer turns it into a [`NormalizedEvent`], which is
//! what the intermediate JSON-lines file holds and what a warehouse loads.

use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Canonical textual timestamp: `dd/mm/yyyy HH:MM:SS`.
pub const CANONICAL_TS_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Placeholder for missing categorical values and unresolvable session ids.
pub const UNKNOWN: &str = "Unknown";

/// Fallback layouts accepted when re-reading a `ts` that is not canonical.
const ISO_DATE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

// ─── Raw input ───────────────────────────────────────────────────────────────

/// The `ts` column of the snapshot, which mixes two encodings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
  /// Textual timestamp, usually ISO-style (`2023-05-01T12:00:00`) or a
  /// stringified epoch.
  Text(String),
  /// Numeric Unix epoch in seconds, possibly fractional.
  Epoch(f64),
}

impl fmt::Display for RawTimestamp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Text(text) => f.write_str(text),
      Self::Epoch(secs) => write!(f, "{secs}"),
    }
  }
}

/// One row of the raw tracking snapshot.
///
/// Every column is nullable in the source. Unknown columns are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
  pub ts:           Option<RawTimestamp>,
  pub event_type:   Option<String>,
  pub session_id:   Option<String>,
  pub user_country: Option<String>,
  pub user_agent:   Option<String>,
  pub page_country: Option<String>,
  pub env:          Option<String>,
  /// Nested per-row structure; expanded into [`Params`] by the normalizer.
  pub params:       Option<Value>,
}

/// The four sub-fields carried in a raw event's `params` structure.
///
/// Any field may be absent; absent fields default to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Params {
  #[serde(default)]
  pub apartment:  Option<Value>,
  #[serde(default)]
  pub apartments: Option<Value>,
  #[serde(default)]
  pub page:       Option<Value>,
  #[serde(default)]
  pub requests:   Option<Value>,
}

// ─── Normalized output ───────────────────────────────────────────────────────

/// A cleaned event, ready to be written to the intermediate file and loaded.
///
/// Produced by the normalizer: `ts` is canonical, categorical fields hold
/// [`UNKNOWN`] instead of nothing, and `session_id` is always set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
  pub ts:           String,
  pub event_type:   String,
  pub session_id:   String,
  pub user_country: String,
  pub user_agent:   String,
  pub page_country: String,
  pub env:          String,
  pub apartment:    Option<Value>,
  pub apartments:   Option<Value>,
  pub page:         Option<Value>,
  pub requests:     Option<Value>,
}

impl NormalizedEvent {
  /// Re-parse `ts` into a date value for the fact table.
  ///
  /// Accepts the canonical format, RFC 3339, and ISO-style layouts.
  pub fn event_date(&self) -> Result<NaiveDateTime> {
    let value = self.ts.trim();

    if let Ok(date) = NaiveDateTime::parse_from_str(value, CANONICAL_TS_FORMAT) {
      return Ok(date);
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
      return Ok(date.naive_utc());
    }
    ISO_DATE_FORMATS
      .iter()
      .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
      .ok_or_else(|| Error::DateParse { value: self.ts.clone() })
  }
}

/// Render an expanded `params` value as a text column.
///
/// Strings are stored bare; every other JSON value is stored as compact JSON.
pub fn param_column(value: Option<&Value>) -> Option<String> {
  match value? {
    Value::Null => None,
    Value::String(text) => Some(text.clone()),
    other => Some(other.to_string()),
  }
}
