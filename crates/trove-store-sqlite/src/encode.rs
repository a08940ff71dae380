//! Encoding between normalized events and the plain-text columns stored in
//! SQLite.
//!
//! Dates are stored as `YYYY-MM-DD HH:MM:SS`, the layout SQLite's own date
//! functions understand. Params values go through
//! [`trove_core::event::param_column`].

use chrono::NaiveDateTime;
use trove_core::event::{NormalizedEvent, param_column};

use crate::Result;

const SQLITE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn encode_date(date: NaiveDateTime) -> String {
  date.format(SQLITE_DATE_FORMAT).to_string()
}

/// An event flattened into owned column values, ready to move onto the
/// connection thread.
pub struct EventRow {
  pub ts:           String,
  pub event_type:   String,
  pub session_id:   String,
  pub user_country: String,
  pub user_agent:   String,
  pub page_country: String,
  pub env:          String,
  pub apartment:    Option<String>,
  pub apartments:   Option<String>,
  pub page:         Option<String>,
  pub requests:     Option<String>,
  pub date:         String,
}

impl EventRow {
  /// Fails if `ts` cannot be re-parsed into a date.
  pub fn encode(event: &NormalizedEvent) -> Result<Self> {
    let date = event.event_date()?;

    Ok(Self {
      ts:           event.ts.clone(),
      event_type:   event.event_type.clone(),
      session_id:   event.session_id.clone(),
      user_country: event.user_country.clone(),
      user_agent:   event.user_agent.clone(),
      page_country: event.page_country.clone(),
      env:          event.env.clone(),
      apartment:    param_column(event.apartment.as_ref()),
      apartments:   param_column(event.apartments.as_ref()),
      page:         param_column(event.page.as_ref()),
      requests:     param_column(event.requests.as_ref()),
      date:         encode_date(date),
    })
  }
}
