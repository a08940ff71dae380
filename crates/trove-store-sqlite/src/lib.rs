//! SQLite backend for the Trove warehouse.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod encode;
mod schema;
mod warehouse;

pub mod error;

pub use error::{Error, Result};
pub use warehouse::SqliteWarehouse;

#[cfg(test)]
mod tests;
