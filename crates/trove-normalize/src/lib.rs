//! Normalizer for raw event-tracking snapshots.
//!
//! Pure synchronous; no database dependencies. Reads a Parquet snapshot,
//! cleans every row into a [`NormalizedEvent`], and persists the result as
//! JSON lines for the loader stage.
//!
//! # Quick start
//!
//! ```no_run
//! let normalized = trove_normalize::run("files/parquet/events.parquet").unwrap();
//! trove_normalize::jsonl::write("files/json/events.json", &normalized.events).unwrap();
//! ```

pub mod error;
pub mod jsonl;
mod params;
mod pipeline;
mod session;
mod source;
mod timestamp;

pub use error::{Error, Result};
pub use params::expand_params;
pub use pipeline::{NormalizeStats, Normalized, normalize, run, sanitize_categoricals};
pub use session::{AgentSessionLookup, Backfill, backfill_session_id};
pub use source::load;
pub use timestamp::normalize_timestamp;
pub use trove_core::event::NormalizedEvent;
