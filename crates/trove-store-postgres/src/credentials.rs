//! Database credentials, read from a JSON file.

use std::{fmt, path::Path};

use config::{Config, File, FileFormat};
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

use crate::Result;

/// Connection details for the Postgres warehouse.
///
/// The on-disk shape is a flat JSON object with the keys `username`,
/// `password`, `host`, `port` and `db`.
#[derive(Clone, Deserialize)]
pub struct Credentials {
  pub username: String,
  pub password: String,
  pub host:     String,
  pub port:     u16,
  pub db:       String,
}

impl Credentials {
  /// Read credentials from the JSON file at `path`.
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let settings = Config::builder()
      .add_source(File::from(path.as_ref()).format(FileFormat::Json))
      .build()?;
    Ok(settings.try_deserialize()?)
  }

  pub fn connect_options(&self) -> PgConnectOptions {
    PgConnectOptions::new()
      .host(&self.host)
      .port(self.port)
      .username(&self.username)
      .password(&self.password)
      .database(&self.db)
  }
}

impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credentials")
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .field("host", &self.host)
      .field("port", &self.port)
      .field("db", &self.db)
      .finish()
  }
}
