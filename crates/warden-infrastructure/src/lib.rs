//! Concrete adapters for the ambient infrastructure concerns: layered
//! configuration, the concurrency limiter, memory monitor, watchdog,
//! progress channel, resilience pipelines, the checkpoint store, and
//! structured logging setup.

#![warn(missing_docs)]

pub mod checkpoint;
pub mod concurrency;
pub mod config;
pub mod logging;
pub mod memory;
pub mod progress;
pub mod queue;
pub mod repository;
pub mod resilience;
pub mod watchdog;
