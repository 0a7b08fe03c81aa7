//! Concrete adapters implementing the `warden_domain::ports` capability
//! interfaces: tokenizer, chunker, embedding client, LLM client, vector
//! store, and blob store.

#![warn(missing_docs)]

pub mod blobstore;
pub mod chunking;
pub mod embedding;
pub mod llm;
pub mod tokenizer;
pub mod vectorstore;
