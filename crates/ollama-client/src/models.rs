//! Wire models for the Ollama generate API

use serde::{Deserialize, Serialize};

/// Request body for `POST /api/generate`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Model name, e.g. `llama3`
    pub model: String,
    /// Prompt text
    pub prompt: String,
    /// Always false: the client waits for the whole response
    pub stream: bool,
}

impl GenerateRequest {
    /// Creates a non-streaming request.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: false,
        }
    }
}

/// Response envelope; fields other than `response` are ignored
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GenerateResponse {
    /// Generated text
    pub response: String,
}

/// Successful analysis together with the attempt that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// Text of the `response` field, possibly empty
    pub text: String,
    /// 1-based attempt number that succeeded
    pub attempts: u32,
}
