//! Agent→session lookup and session-id backfill.

use std::collections::{HashMap, HashSet};

use trove_core::event::NormalizedEvent;

use crate::{Error, Result};

/// Maps a user agent to a session id observed for it in the same batch.
///
/// Built once per dataset. Distinct `(user_agent, session_id)` pairs are
/// taken in order of first appearance; when an agent has several sessions,
/// the pair that appears last in that order wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentSessionLookup {
  sessions: HashMap<String, String>,
}

impl AgentSessionLookup {
  /// Scan `events` for records carrying a session id.
  pub fn build(events: &[NormalizedEvent]) -> Self {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut sessions = HashMap::new();

    for event in events.iter().filter(|e| !e.session_id.is_empty()) {
      if seen.insert((event.user_agent.as_str(), event.session_id.as_str())) {
        sessions.insert(event.user_agent.clone(), event.session_id.clone());
      }
    }

    Self { sessions }
  }

  pub fn get(&self, user_agent: &str) -> Option<&str> {
    self.sessions.get(user_agent).map(String::as_str)
  }

  pub fn len(&self) -> usize { self.sessions.len() }

  pub fn is_empty(&self) -> bool { self.sessions.is_empty() }
}

/// What [`backfill_session_id`] did to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backfill {
  /// The record already had a session id; nothing changed.
  Present,
  /// The session id was filled from the lookup.
  Filled,
}

/// Fill an empty `session_id` from `lookup`, keyed by the record's agent.
///
/// Returns [`Error::LookupMiss`] when no other record shares the agent; the
/// record is left untouched in that case.
pub fn backfill_session_id(
  event:  &mut NormalizedEvent,
  lookup: &AgentSessionLookup,
) -> Result<Backfill> {
  if !event.session_id.is_empty() {
    return Ok(Backfill::Present);
  }

  let session_id = lookup
    .get(&event.user_agent)
    .ok_or_else(|| Error::LookupMiss(event.user_agent.clone()))?;
  event.session_id = session_id.to_owned();
  Ok(Backfill::Filled)
}
