//! Core entities, value objects, and port traits for the analysis
//! orchestrator.
//!
//! This crate has no async runtime dependency beyond `async-trait` (used
//! only for trait method signatures) and no I/O of its own: every adapter
//! lives in `warden-infrastructure` or `warden-providers` and depends on
//! this crate, never the other way around.

#![warn(missing_docs)]

pub mod entities;
pub mod error;
pub mod ports;
pub mod schema;

pub use error::{Error, ErrorKind, Result};
