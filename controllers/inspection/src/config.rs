//! Controller configuration loaded from environment variables.

use crate::error::ControllerError;
use ollama_client::{DEFAULT_BACKOFF, DEFAULT_BASE_URL, DEFAULT_MODEL, OllamaConfig};
use std::time::Duration;

/// Runtime configuration for the Inspection Controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Inference service settings
    pub ollama: OllamaConfig,
    /// Namespace to watch for InspectionReports; `None` watches all namespaces
    pub namespace: Option<String>,
}

impl ControllerConfig {
    /// Loads configuration from the process environment.
    ///
    /// * `OLLAMA_URL` - inference service base URL
    /// * `OLLAMA_MODEL` - default model
    /// * `OLLAMA_BACKOFF_SECONDS` - delay between failed attempts
    /// * `WATCH_NAMESPACE` - restrict the watch to one namespace
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("OLLAMA_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = lookup("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let backoff = match lookup("OLLAMA_BACKOFF_SECONDS") {
            Some(raw) => Duration::from_secs(raw.trim().parse::<u64>().map_err(|e| {
                ControllerError::InvalidConfig(format!("OLLAMA_BACKOFF_SECONDS '{raw}': {e}"))
            })?),
            None => DEFAULT_BACKOFF,
        };
        let namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.is_empty());

        Ok(Self {
            ollama: OllamaConfig::new(base_url)
                .with_model(model)
                .with_backoff(backoff),
            namespace,
        })
    }
}
