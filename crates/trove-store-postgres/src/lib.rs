//! Postgres backend for the Trove warehouse.
//!
//! Connects with the `username`/`password`/`host`/`port`/`db` credentials file
//! and holds a single [`sqlx::PgConnection`] for the lifetime of the handle.

mod credentials;
mod schema;
mod warehouse;

pub mod error;

pub use credentials::Credentials;
pub use error::{Error, Result};
pub use warehouse::PgWarehouse;
