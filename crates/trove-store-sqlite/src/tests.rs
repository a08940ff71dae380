//! Integration tests for `SqliteWarehouse` against in-memory and temporary
//! databases.

use std::path::PathBuf;

use serde_json::json;
use trove_core::{
  event::NormalizedEvent,
  warehouse::{DIM_SESSIONS, FCT_EVENTS, LoadReport, Warehouse},
};

use crate::{Error, SqliteWarehouse};

async fn warehouse() -> SqliteWarehouse {
  let mut w = SqliteWarehouse::open_in_memory()
    .await
    .expect("in-memory warehouse");
  w.ensure_schema().await.expect("schema");
  w
}

fn event(session_id: &str, user_agent: &str, ts: &str) -> NormalizedEvent {
  NormalizedEvent {
    ts:           ts.into(),
    event_type:   "pageview".into(),
    session_id:   session_id.into(),
    user_country: "DE".into(),
    user_agent:   user_agent.into(),
    page_country: "DE".into(),
    env:          "prod".into(),
    apartment:    Some(json!("A1")),
    apartments:   Some(json!(["A1", "A2"])),
    page:         Some(json!("p1")),
    requests:     Some(json!(3)),
  }
}

async fn count(w: &SqliteWarehouse, table: &'static str) -> i64 {
  w.conn
    .call(move |conn| {
      Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
    })
    .await
    .unwrap()
}

async fn tables(w: &SqliteWarehouse) -> Vec<String> {
  w.conn
    .call(|conn| {
      let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
         ORDER BY name",
      )?;
      let names = stmt
        .query_map([], |r| r.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
      Ok(names)
    })
    .await
    .unwrap()
}

// ─── Schema ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ensure_schema_is_idempotent() {
  let mut w = SqliteWarehouse::open_in_memory().await.unwrap();

  w.ensure_schema().await.unwrap();
  let first = tables(&w).await;
  w.ensure_schema().await.unwrap();
  let second = tables(&w).await;

  assert_eq!(first, [DIM_SESSIONS, FCT_EVENTS]);
  assert_eq!(first, second);
}

#[tokio::test]
async fn load_before_schema_is_rejected() {
  let mut w = SqliteWarehouse::open_in_memory().await.unwrap();

  let err = w
    .load_records(&[event("S1", "UA1", "01/05/2023 12:00:00")])
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(trove_core::Error::SchemaNotReady)));
}

// ─── Loading ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn load_writes_fact_and_dimension_rows() {
  let mut w = warehouse().await;

  let report = w
    .load_records(&[
      event("S1", "UA1", "01/05/2023 12:00:00"),
      event("S1", "UA1", "01/05/2023 12:05:00"),
      event("S2", "UA2", "02/05/2023 08:30:00"),
    ])
    .await
    .unwrap();

  assert_eq!(report, LoadReport { loaded: 3, failed: 0 });
  assert_eq!(count(&w, FCT_EVENTS).await, 3);
  assert_eq!(count(&w, DIM_SESSIONS).await, 2);
}

#[tokio::test]
async fn reloading_duplicates_facts_but_not_sessions() {
  let mut w = warehouse().await;
  let batch = [
    event("S1", "UA1", "01/05/2023 12:00:00"),
    event("S2", "UA2", "01/05/2023 12:01:00"),
  ];

  w.load_records(&batch).await.unwrap();
  w.load_records(&batch).await.unwrap();

  assert_eq!(count(&w, FCT_EVENTS).await, 4);
  assert_eq!(count(&w, DIM_SESSIONS).await, 2);
}

#[tokio::test]
async fn first_writer_wins_on_session_conflict() {
  let mut w = warehouse().await;

  w.load_records(&[
    event("S1", "UA1", "01/05/2023 12:00:00"),
    event("S1", "UA-other", "01/05/2023 12:01:00"),
  ])
  .await
  .unwrap();

  let agent: String = w
    .conn
    .call(|conn| {
      Ok(conn.query_row(
        "SELECT user_agent FROM dim_sessions WHERE session_id = 'S1'",
        [],
        |r| r.get(0),
      )?)
    })
    .await
    .unwrap();
  assert_eq!(agent, "UA1");
}

#[tokio::test]
async fn stored_columns_are_encoded() {
  let mut w = warehouse().await;
  let mut sparse = event("S1", "UA1", "01/05/2023 12:00:00");
  sparse.page = None;

  w.load_records(&[sparse]).await.unwrap();

  let (date, apartment, apartments, page, requests): (
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
  ) = w
    .conn
    .call(|conn| {
      Ok(conn.query_row(
        "SELECT date, apartment, apartments, page, requests FROM fct_customer_events_data",
        [],
        |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)),
      )?)
    })
    .await
    .unwrap();

  assert_eq!(date, "2023-05-01 12:00:00");
  assert_eq!(apartment.as_deref(), Some("A1"));
  assert_eq!(apartments.as_deref(), Some(r#"["A1","A2"]"#));
  assert_eq!(page, None);
  assert_eq!(requests.as_deref(), Some("3"));
}

#[tokio::test]
async fn unparseable_date_rolls_back_only_that_record() {
  let mut w = warehouse().await;

  let report = w
    .load_records(&[
      event("S1", "UA1", "01/05/2023 12:00:00"),
      event("S9", "UA9", "not a date"),
      event("S2", "UA2", "01/05/2023 12:02:00"),
    ])
    .await
    .unwrap();

  assert_eq!(report, LoadReport { loaded: 2, failed: 1 });
  assert_eq!(count(&w, FCT_EVENTS).await, 2);
  // The failed record's session was not written either.
  assert_eq!(count(&w, DIM_SESSIONS).await, 2);
}

#[tokio::test]
async fn every_fact_has_its_session() {
  let mut w = warehouse().await;

  w.load_records(&[
    event("S1", "UA1", "01/05/2023 12:00:00"),
    event("Unknown", "UA9", "01/05/2023 12:01:00"),
  ])
  .await
  .unwrap();

  let orphans: i64 = w
    .conn
    .call(|conn| {
      Ok(conn.query_row(
        "SELECT COUNT(*) FROM fct_customer_events_data f
         LEFT JOIN dim_sessions d ON d.session_id = f.session_id
         WHERE d.session_id IS NULL",
        [],
        |r| r.get(0),
      )?)
    })
    .await
    .unwrap();
  assert_eq!(orphans, 0);
}

// ─── Connections ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn check_connection_reports_reachability() {
  let dir = tempfile::tempdir().unwrap();

  assert!(SqliteWarehouse::check_connection(&dir.path().join("warehouse.db")).await);

  let unreachable = PathBuf::from("/nonexistent-trove-dir/nested/warehouse.db");
  assert!(!SqliteWarehouse::check_connection(&unreachable).await);
}

#[tokio::test]
async fn open_on_unreachable_path_fails() {
  let unreachable = PathBuf::from("/nonexistent-trove-dir/nested/warehouse.db");
  let err = SqliteWarehouse::open(&unreachable).await.err().unwrap();
  assert!(matches!(err, Error::Database(_)));
}

#[tokio::test]
async fn file_warehouse_persists_across_connections() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("warehouse.db");

  let mut w = SqliteWarehouse::open(&path).await.unwrap();
  w.ensure_schema().await.unwrap();
  w.load_records(&[event("S1", "UA1", "01/05/2023 12:00:00")])
    .await
    .unwrap();
  w.close().await.unwrap();

  let mut w = SqliteWarehouse::open(&path).await.unwrap();
  w.ensure_schema().await.unwrap();
  assert_eq!(count(&w, FCT_EVENTS).await, 1);
  assert_eq!(count(&w, DIM_SESSIONS).await, 1);
  w.close().await.unwrap();
}
