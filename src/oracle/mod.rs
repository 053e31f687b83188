//! State oracle adapter.
//!
//! Consulted only for names the rule cascade cannot read. Wraps an
//! external classifier behind a one-method backend trait, with a federal
//! keyword pre-filter and a per-run cache in front of it.

pub mod cache;
pub mod classifier;
pub mod client;

pub use classifier::StateClassifier;
pub use client::{MessagesBackend, OracleBackend, OracleError};
