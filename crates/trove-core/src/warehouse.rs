//! The `Warehouse` trait: the load protocol for normalized events.
//!
//! A warehouse holds a dimension table (`dim_sessions`, keyed by session id)
//! and an append-only fact table (`fct_customer_events_data`). Backends
//! implement this trait; the pipeline driver depends on the abstraction only.
//!
//! A handle moves through these states:
//!
//! ```text
//! Disconnected --check_connection--> Disconnected
//! Disconnected --open--------------> Connected
//! Connected    --ensure_schema-----> SchemaReady
//! SchemaReady  --load_records------> SchemaReady
//! any          --close-------------> Disconnected
//! ```
//!
//! `load_records` on a handle that has not run `ensure_schema` is rejected
//! with [`Error::SchemaNotReady`](crate::Error::SchemaNotReady).

use std::future::Future;

use crate::event::NormalizedEvent;

/// Name of the dimension table.
pub const DIM_SESSIONS: &str = "dim_sessions";

/// Name of the fact table.
pub const FCT_EVENTS: &str = "fct_customer_events_data";

/// Outcome of [`Warehouse::load_records`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
  /// Records whose fact row and dimension row were committed.
  pub loaded: usize,
  /// Records rolled back because their date or a statement failed.
  pub failed: usize,
}

/// Abstraction over a relational warehouse backend.
///
/// Mutating methods take `&mut self`: a handle owns its connection
/// exclusively and is never shared between call sites.
pub trait Warehouse: Sized + Send {
  /// What a connection is opened against (a file path, a set of
  /// credentials, ...).
  type Target: Send + Sync;
  type Error: std::error::Error + Send + Sync + 'static;

  /// Open a short-lived connection and run a liveness query.
  ///
  /// Advisory: returns `false` on any failure and logs the cause instead of
  /// raising it.
  fn check_connection(
    target: &Self::Target,
  ) -> impl Future<Output = bool> + Send + '_;

  /// Open the long-lived connection used by the remaining operations.
  fn open(
    target: &Self::Target,
  ) -> impl Future<Output = Result<Self, Self::Error>> + Send + '_;

  /// Create the dimension and fact tables if absent.
  ///
  /// Idempotent; each statement commits on its own.
  fn ensure_schema(
    &mut self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Write every record, in order, as one fact insert plus one dimension
  /// upsert sharing a single transaction.
  ///
  /// A record that fails is rolled back, logged, and counted in
  /// [`LoadReport::failed`]; the batch carries on.
  fn load_records<'a>(
    &'a mut self,
    records: &'a [NormalizedEvent],
  ) -> impl Future<Output = Result<LoadReport, Self::Error>> + Send + 'a;

  /// Release the connection.
  fn close(self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
