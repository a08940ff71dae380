//! SQL schema for the Trove Postgres warehouse.

/// DDL statements, executed one by one so each commits independently.
pub const SCHEMA: &[&str] = &[
  "CREATE TABLE IF NOT EXISTS dim_sessions (
       session_id  TEXT PRIMARY KEY,
       user_agent  TEXT NOT NULL
   )",
  "CREATE TABLE IF NOT EXISTS fct_customer_events_data (
       id            BIGSERIAL PRIMARY KEY,
       ts            TEXT NOT NULL,
       event_type    TEXT NOT NULL,
       session_id    TEXT NOT NULL REFERENCES dim_sessions(session_id),
       user_country  TEXT NOT NULL,
       user_agent    TEXT NOT NULL,
       page_country  TEXT NOT NULL,
       env           TEXT NOT NULL,
       apartment     TEXT,
       apartments    TEXT,
       page          TEXT,
       requests      TEXT,
       date          TIMESTAMP NOT NULL
   )",
];

/// Insert-if-absent for the dimension table.
pub const UPSERT_SESSION: &str = "
INSERT INTO dim_sessions (session_id, user_agent) VALUES ($1, $2)
ON CONFLICT (session_id) DO NOTHING";

pub const INSERT_EVENT: &str = "
INSERT INTO fct_customer_events_data (
    ts, event_type, session_id, user_country, user_agent, page_country, env,
    apartment, apartments, page, requests, date
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)";

#[cfg(test)]
mod tests {
  use trove_core::warehouse::{DIM_SESSIONS, FCT_EVENTS};

  use super::*;

  #[test]
  fn every_statement_is_idempotent() {
    assert!(SCHEMA.iter().all(|s| s.contains("IF NOT EXISTS")));
  }

  #[test]
  fn dimension_is_created_before_the_fact_table() {
    assert!(SCHEMA[0].contains(DIM_SESSIONS));
    assert!(SCHEMA[1].contains(FCT_EVENTS));
  }

  #[test]
  fn insert_binds_every_column() {
    let columns = INSERT_EVENT
      .split_once('(')
      .and_then(|(_, rest)| rest.split_once(')'))
      .map(|(cols, _)| cols.split(',').count())
      .unwrap();
    assert_eq!(columns, 12);
    assert!(INSERT_EVENT.contains("$12"));
  }
}
