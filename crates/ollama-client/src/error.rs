//! Ollama client errors

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when querying the inference service
#[derive(Debug, Error)]
pub enum OllamaError {
    /// HTTP request/response error (connection refused, reset, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-2xx status
    #[error("Ollama returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, truncated
        body: String,
    },

    /// The attempt did not complete within its timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The response body was not a valid generate envelope
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Every attempt failed
    #[error("Ollama request failed after {attempts} attempts: {last}")]
    Exhausted {
        /// Number of attempts made
        attempts: u32,
        /// Error recorded by the final attempt
        last: Box<OllamaError>,
    },
}

impl OllamaError {
    /// Whether the failure happened before a response body was obtained.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. } | Self::Timeout(_))
    }
}
