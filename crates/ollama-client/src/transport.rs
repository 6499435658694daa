//! Transport abstraction over the generate endpoint
//!
//! The trait lets the retry logic in [`crate::AnalysisClient`] be exercised
//! without a running Ollama instance. `HttpTransport` is the production
//! implementation.

use crate::config::OllamaConfig;
use crate::error::OllamaError;
use crate::models::GenerateRequest;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Maximum number of body characters kept in a status error.
const ERROR_BODY_LIMIT: usize = 500;

/// Sends one generate request and returns the raw response body.
///
/// Implementations must return `Err` for transport failures and non-2xx
/// responses; body parsing is left to the caller.
#[async_trait::async_trait]
pub trait InferenceTransport: Send + Sync {
    /// Performs a single attempt bounded by `timeout`.
    async fn generate(&self, request: &GenerateRequest, timeout: Duration) -> Result<String, OllamaError>;
}

/// reqwest-backed transport posting JSON to `/api/generate`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    /// Creates a transport for the endpoint in `config`.
    pub fn new(config: &OllamaConfig) -> Result<Self, OllamaError> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            url: config.generate_url(),
        })
    }

    /// The generate endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl InferenceTransport for HttpTransport {
    async fn generate(&self, request: &GenerateRequest, timeout: Duration) -> Result<String, OllamaError> {
        debug!("POST {} (model {}, timeout {:?})", self.url, request.model, timeout);

        let response = self.client
            .post(&self.url)
            .timeout(timeout)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(OllamaError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        Ok(body)
    }
}
