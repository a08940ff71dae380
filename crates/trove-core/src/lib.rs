//! Core types and trait definitions for the Trove event pipeline.
//!
//! This crate is deliberately free of file-format and database dependencies.
//! The normalizer produces [`event::NormalizedEvent`]s and the store crates
//! implement [`warehouse::Warehouse`] to load them.

pub mod error;
pub mod event;
pub mod warehouse;

pub use error::{Error, Result};
