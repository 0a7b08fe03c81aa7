//! Use-case orchestration for the analysis pipeline: file routing,
//! chunk/embed/index retrieval, and agent fan-out with guardrails.
//!
//! This crate depends only on `warden-domain`'s ports; concrete adapters
//! (tokenizer, chunker, embedder, vector store, LLM provider, concurrency
//! limiter, memory monitor, watchdog, progress channel, checkpoint store)
//! are injected by the `warden-worker` binary at construction time.

#![warn(missing_docs)]

pub mod use_cases;

pub use use_cases::agents::AgentOrchestrator;
pub use use_cases::job_consumer::JobConsumer;
pub use use_cases::retrieval::{IndexResult, RetrievalOrchestrator};
pub use use_cases::routing::{FileRouter, RouterConfig, RouterEstimate};
