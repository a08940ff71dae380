//! [`PgWarehouse`], the Postgres implementation of [`Warehouse`].

use sqlx::{Connection, PgConnection};
use trove_core::{
  event::{NormalizedEvent, param_column},
  warehouse::{LoadReport, Warehouse},
};

use crate::{
  Credentials, Error, Result,
  schema::{INSERT_EVENT, SCHEMA, UPSERT_SESSION},
};

// ─── Warehouse ───────────────────────────────────────────────────────────────

/// A Trove warehouse living in a Postgres database.
pub struct PgWarehouse {
  conn:         PgConnection,
  schema_ready: bool,
}

impl PgWarehouse {
  async fn connect(target: &Credentials) -> Result<PgConnection> {
    Ok(PgConnection::connect_with(&target.connect_options()).await?)
  }

  async fn probe(conn: &mut PgConnection) -> Result<()> {
    let answer: i32 = sqlx::query_scalar("SELECT 1").fetch_one(conn).await?;
    if answer != 1 {
      return Err(Error::UnexpectedProbe(answer));
    }
    Ok(())
  }

  /// Upsert the session and insert the event in one transaction.
  ///
  /// Dropping the transaction on any early return rolls it back.
  async fn load_one(&mut self, event: &NormalizedEvent) -> Result<()> {
    let date = event.event_date()?;
    let mut tx = self.conn.begin().await?;

    sqlx::query(UPSERT_SESSION)
      .bind(event.session_id.as_str())
      .bind(event.user_agent.as_str())
      .execute(&mut *tx)
      .await?;

    sqlx::query(INSERT_EVENT)
      .bind(event.ts.as_str())
      .bind(event.event_type.as_str())
      .bind(event.session_id.as_str())
      .bind(event.user_country.as_str())
      .bind(event.user_agent.as_str())
      .bind(event.page_country.as_str())
      .bind(event.env.as_str())
      .bind(param_column(event.apartment.as_ref()))
      .bind(param_column(event.apartments.as_ref()))
      .bind(param_column(event.page.as_ref()))
      .bind(param_column(event.requests.as_ref()))
      .bind(date)
      .execute(&mut *tx)
      .await?;

    tx.commit().await?;
    Ok(())
  }
}

// ─── Warehouse impl ──────────────────────────────────────────────────────────

impl Warehouse for PgWarehouse {
  type Target = Credentials;
  type Error = Error;

  async fn check_connection(target: &Credentials) -> bool {
    let outcome = async {
      let mut conn = Self::connect(target).await?;
      let probed = Self::probe(&mut conn).await;
      conn.close().await?;
      probed
    }
    .await;

    match outcome {
      Ok(()) => {
        tracing::debug!(host = %target.host, db = %target.db, "warehouse is reachable");
        true
      }
      Err(e) => {
        tracing::error!(
          host = %target.host,
          port = target.port,
          db = %target.db,
          error = %e,
          "warehouse connectivity check failed"
        );
        false
      }
    }
  }

  async fn open(target: &Credentials) -> Result<Self> {
    let conn = Self::connect(target).await?;
    tracing::info!(host = %target.host, db = %target.db, "opened warehouse");
    Ok(Self { conn, schema_ready: false })
  }

  async fn ensure_schema(&mut self) -> Result<()> {
    for statement in SCHEMA {
      sqlx::query(*statement).execute(&mut self.conn).await?;
    }

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
