//! Client configuration

use std::time::Duration;

/// In-cluster address of the Ollama service
pub const DEFAULT_BASE_URL: &str = "http://ollama.ollama.svc.cluster.local:11434";

/// Model used when neither the controller nor the report names one
pub const DEFAULT_MODEL: &str = "llama3";

/// Delay between failed attempts
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(2);

/// Connection settings for the inference service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaConfig {
    /// Base URL without trailing slash, e.g. `http://ollama:11434`
    pub base_url: String,
    /// Default model name
    pub model: String,
    /// Fixed delay inserted after a failed attempt when attempts remain
    pub backoff: Duration,
}

impl OllamaConfig {
    /// Creates a config with the default model and backoff.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Overrides the default model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the backoff between attempts.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Full URL of the generate endpoint.
    pub fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            backoff: DEFAULT_BACKOFF,
        }
    }
}
