//! The normalization pipeline.
//!
//! Stages, in order:
//!   raw rows
//!     └─ expand_params()          → four flat params fields
//!          └─ normalize_timestamp()   → canonical `ts` or ""
//!               └─ drop rows with empty `ts`
//!                    └─ sanitize_categoricals()
//!                         └─ AgentSessionLookup::build() over survivors
//!                              └─ backfill_session_id()

use std::path::Path;

use trove_core::event::{NormalizedEvent, Params, RawEvent, UNKNOWN};

use crate::{
  Result,
  params::expand_params,
  session::{AgentSessionLookup, Backfill, backfill_session_id},
  source,
  timestamp::normalize_timestamp,
};

/// Per-run counters, logged once the pipeline finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
  /// Rows read from the snapshot.
  pub loaded:             usize,
  /// Rows whose `params` could not be expanded (kept with null fields).
  pub params_failures:    usize,
  /// Rows whose `ts` was present but unparseable.
  pub timestamp_failures: usize,
  /// Rows dropped because their canonical `ts` ended up empty.
  pub dropped:            usize,
  /// Rows whose session id was filled from the agent lookup.
  pub backfilled:         usize,
  /// Rows given the sentinel session id because their agent was unknown.
  pub lookup_misses:      usize,
}

/// The output of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
  pub events: Vec<NormalizedEvent>,
  pub stats:  NormalizeStats,
}

/// Load the Parquet snapshot at `path` and normalize it.
pub fn run(path: impl AsRef<Path>) -> Result<Normalized> {
  let raw = source::load(path)?;
  Ok(normalize(raw))
}

/// Normalize an in-memory raw dataset.
///
/// Per-record failures are logged and localized; they never abort the batch.
pub fn normalize(raw: Vec<RawEvent>) -> Normalized {
  let mut stats = NormalizeStats {
    loaded: raw.len(),
    ..NormalizeStats::default()
  };

  let mut events: Vec<NormalizedEvent> = raw
    .into_iter()
    .enumerate()
    .map(|(index, event)| flatten(index, event, &mut stats))
    .collect();

  events.retain(|e| !e.ts.is_empty());
  stats.dropped = stats.loaded - events.len();

  events.iter_mut().for_each(sanitize_categoricals);

  let lookup = AgentSessionLookup::build(&events);
  tracing::debug!(agents = lookup.len(), "built agent→session lookup");

  for event in &mut events {
    match backfill_session_id(event, &lookup) {
      Ok(Backfill::Present) => {}
      Ok(Backfill::Filled) => stats.backfilled += 1,
      Err(e) => {
        tracing::warn!(error = %e, "no session to backfill; using sentinel");
        event.session_id = UNKNOWN.to_owned();
        stats.lookup_misses += 1;
      }
    }
  }

  tracing::info!(
    loaded = stats.loaded,
    kept = events.len(),
    dropped = stats.dropped,
    params_failures = stats.params_failures,
    timestamp_failures = stats.timestamp_failures,
    backfilled = stats.backfilled,
    lookup_misses = stats.lookup_misses,
    "normalized snapshot"
  );

  Normalized { events, stats }
}

/// Replace null or empty categorical values with [`UNKNOWN`].
pub fn sanitize_categoricals(event: &mut NormalizedEvent) {
  for field in [
    &mut event.event_type,
    &mut event.user_country,
    &mut event.user_agent,
    &mut event.page_country,
    &mut event.env,
  ] {
    if field.is_empty() {
      *field = UNKNOWN.to_owned();
    }
  }
}

/// Expand params and repair `ts` for one raw row.
fn flatten(index: usize, raw: RawEvent, stats: &mut NormalizeStats) -> NormalizedEvent {
  let params = expand_params(&raw).unwrap_or_else(|e| {
    tracing::warn!(row = index, error = %e, "could not expand params");
    stats.params_failures += 1;
    Params::default()
  });

  let ts = normalize_timestamp(raw.ts.as_ref()).unwrap_or_else(|e| {
    tracing::warn!(row = index, error = %e, "could not normalize timestamp");
    stats.timestamp_failures += 1;
    String::new()
  });

  NormalizedEvent {
    ts,
    event_type:   raw.event_type.unwrap_or_default(),
    session_id:   raw.session_id.unwrap_or_default(),
    user_country: raw.user_country.unwrap_or_default(),
    user_agent:   raw.user_agent.unwrap_or_default(),
    page_country: raw.page_country.unwrap_or_default(),
    env:          raw.env.unwrap_or_default(),
    apartment:    params.apartment,
    apartments:   params.apartments,
    page:         params.page,
    requests:     params.requests,
  }
}
