//! [`SqliteWarehouse`], the SQLite implementation of [`Warehouse`].

use std::path::PathBuf;

use trove_core::{
  event::NormalizedEvent,
  warehouse::{LoadReport, Warehouse},
};

use crate::{
  Error, Result,
  encode::EventRow,
  schema::{INSERT_EVENT, SCHEMA, UPSERT_SESSION},
};

// ─── Warehouse ───────────────────────────────────────────────────────────────

/// A Trove warehouse backed by a single SQLite file.
pub struct SqliteWarehouse {
  pub(crate) conn: tokio_rusqlite::Connection,
  schema_ready:    bool,
}

impl SqliteWarehouse {
  /// Open an in-memory warehouse, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Ok(Self { conn, schema_ready: false })
  }

  /// Run the liveness query on `conn`.
  async fn probe(conn: &tokio_rusqlite::Connection) -> Result<()> {
    let answer: i64 = conn
      .call(|conn| Ok(conn.query_row("SELECT 1", [], |row| row.get(0))?))
      .await?;

    if answer != 1 {
      return Err(Error::UnexpectedProbe(answer));
    }
    Ok(())
  }

  /// Upsert the session and insert the event in one transaction.
  async fn load_one(&self, event: &NormalizedEvent) -> Result<()> {
    let row = EventRow::encode(event)?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(UPSERT_SESSION, rusqlite::params![row.session_id, row.user_agent])?;
        tx.execute(
          INSERT_EVENT,
          rusqlite::params![
            row.ts,
            row.event_type,
            row.session_id,
            row.user_country,
            row.user_agent,
            row.page_country,
            row.env,
            row.apartment,
            row.apartments,
            row.page,
            row.requests,
            row.date,
          ],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Warehouse impl ──────────────────────────────────────────────────────────

impl Warehouse for SqliteWarehouse {
  type Target = PathBuf;
  type Error = Error;

  async fn check_connection(target: &PathBuf) -> bool {
    let outcome = async {
      let conn = tokio_rusqlite::Connection::open(target).await?;
      Self::probe(&conn).await?;
      conn.close().await?;
      Ok::<_, Error>(())
    }
    .await;

    match outcome {
      Ok(()) => {
        tracing::debug!(path = %target.display(), "warehouse is reachable");
        true
      }
      Err(e) => {
        tracing::error!(path = %target.display(), error = %e, "warehouse connectivity check failed");
        false
      }
    }
  }

  async fn open(target: &PathBuf) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(target).await?;
    tracing::info!(path = %target.display(), "opened warehouse");
    Ok(Self { conn, schema_ready: false })
  }

  async fn ensure_schema(&mut self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;

    self.schema_ready = true;
    tracing::debug!("warehouse schema ensured");
    Ok(())
  }

  async fn load_records(&mut self, records: &[NormalizedEvent]) -> Result<LoadReport> {
    if !self.schema_ready {
      return Err(trove_core::Error::SchemaNotReady.into());
    }

    let mut report = LoadReport::default();
    for (index, event) in records.iter().enumerate() {
      match self.load_one(event).await {
        Ok(()) => report.loaded += 1,
        Err(e) => {
          tracing::warn!(
            index,
            session_id = %event.session_id,
            error = %e,
            "record rolled back"
          );
          report.failed += 1;
        }
      }
    }

    tracing::info!(loaded = report.loaded, failed = report.failed, "loaded batch");
    Ok(report)
  }

  async fn close(self) -> Result<()> {
    self.conn.close().await?;
    tracing::debug!("closed warehouse");
    Ok(())
  }
}
