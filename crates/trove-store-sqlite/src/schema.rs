//! SQL schema for the Trove SQLite warehouse.
//!
//! Run by `ensure_schema` on every load. Each statement autocommits, and all
//! of them are no-ops once the tables exist.

/// Full schema DDL. Every statement is `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

-- One row per distinct session; the first writer wins.
CREATE TABLE IF NOT EXISTS dim_sessions (
    session_id  TEXT PRIMARY KEY,
    user_agent  TEXT NOT NULL
);

-- Events are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS fct_customer_events_data (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    ts            TEXT NOT NULL,   -- canonical dd/mm/yyyy HH:MM:SS
    event_type    TEXT NOT NULL,
    session_id    TEXT NOT NULL REFERENCES dim_sessions(session_id),
    user_country  TEXT NOT NULL,
    user_agent    TEXT NOT NULL,
    page_country  TEXT NOT NULL,
    env           TEXT NOT NULL,
    apartment     TEXT,
    apartments    TEXT,            -- compact JSON when not a plain string
    page          TEXT,
    requests      TEXT,
    date          TEXT NOT NULL    -- YYYY-MM-DD HH:MM:SS, parsed from ts
);

CREATE INDEX IF NOT EXISTS fct_events_session_idx ON fct_customer_events_data(session_id);
CREATE INDEX IF NOT EXISTS fct_events_date_idx    ON fct_customer_events_data(date);
";

/// Insert-if-absent for the dimension table.
pub const UPSERT_SESSION: &str = "
INSERT INTO dim_sessions (session_id, user_agent) VALUES (?1, ?2)
ON CONFLICT (session_id) DO NOTHING";

pub const INSERT_EVENT: &str = "
INSERT INTO fct_customer_events_data (
    ts, event_type, session_id, user_country, user_agent, page_country, env,
    apartment, apartments, page, requests, date
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";
