//! Ollama Inference Client
//!
//! Client for the Ollama `/api/generate` endpoint, used by the inspection
//! controller to turn a cluster summary into an analysis.
//!
//! Each query is bounded: every attempt has a hard timeout and failed attempts
//! are retried a fixed number of times with a constant backoff in between.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod transport;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::*;
pub use config::*;
pub use error::*;
pub use models::*;
pub use transport::*;

#[cfg(any(test, feature = "test-util"))]
pub use mock::*;
