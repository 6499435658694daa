//! Bounded-retry analysis client
//!
//! A query moves through `Idle -> Attempting(i) -> {Success | Attempting(i+1) | Exhausted}`.
//! An attempt succeeds once the transport returns a body that parses as a
//! generate envelope; its `response` field is returned even when empty.
//! Any other outcome is recorded and, if attempts remain, followed by the
//! configured backoff. Parse failures back off too, so the worst-case
//! blocking time of a query is `timeout * attempts + backoff * (attempts - 1)`.
//!
//! Dropping the future returned by [`AnalysisClient::query`] aborts the
//! in-flight attempt and skips the remaining ones.

use crate::config::OllamaConfig;
use crate::error::OllamaError;
use crate::models::{Analysis, GenerateRequest, GenerateResponse};
use crate::transport::{HttpTransport, InferenceTransport};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Client for the inference service
#[derive(Clone)]
pub struct AnalysisClient {
    transport: Arc<dyn InferenceTransport>,
    config: OllamaConfig,
}

impl std::fmt::Debug for AnalysisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AnalysisClient {
    /// Create a client that talks HTTP to `config.base_url`
    pub fn new(config: OllamaConfig) -> Result<Self, OllamaError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over an arbitrary transport
    pub fn with_transport(config: OllamaConfig, transport: Arc<dyn InferenceTransport>) -> Self {
        Self { transport, config }
    }

    /// Client configuration
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Default model name
    pub fn default_model(&self) -> &str {
        &self.config.model
    }

    /// Queries `model` with `prompt`.
    ///
    /// # Arguments
    /// * `timeout_seconds` - Hard limit for each attempt
    /// * `retry_attempts` - Total attempts; callers normalize to at least 1
    ///
    /// # Returns
    /// * `Ok(Analysis)` - First attempt whose body parsed
    /// * `Err(OllamaError::Exhausted)` - Every attempt failed; wraps the last error
    pub async fn query(
        &self,
        model: &str,
        prompt: &str,
        timeout_seconds: u64,
        retry_attempts: u32,
    ) -> Result<Analysis, OllamaError> {
        let request = GenerateRequest::new(model, prompt);
        let timeout = Duration::from_secs(timeout_seconds);
        let attempts = retry_attempts.max(1);

        let mut last_error = None;
        for attempt in 1..=attempts {
            debug!("Ollama attempt {}/{} (model {})", attempt, attempts, model);

            match self.attempt(&request, timeout).await {
                Ok(text) => {
                    debug!("Ollama attempt {} succeeded ({} chars)", attempt, text.len());
                    return Ok(Analysis { text, attempts: attempt });
                }
                Err(e) => {
                    warn!("Ollama attempt {}/{} failed: {}", attempt, attempts, e);
                    last_error = Some(e);
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.config.backoff).await;
            }
        }

        Err(OllamaError::Exhausted {
            attempts,
            last: Box::new(last_error.unwrap_or(OllamaError::Timeout(timeout))),
        })
    }

    async fn attempt(&self, request: &GenerateRequest, timeout: Duration) -> Result<String, OllamaError> {
        let body = tokio::time::timeout(timeout, self.transport.generate(request, timeout))
            .await
            .map_err(|_elapsed| OllamaError::Timeout(timeout))??;

        let envelope: GenerateResponse = serde_json::from_str(&body)?;
        Ok(envelope.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockReply, MockTransport};
    use tokio::time::Instant;

    fn assert_elapsed(start: Instant, seconds: u64) {
        let elapsed = start.elapsed();
        let expected = Duration::from_secs(seconds);
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(100),
            "expected ~{expected:?}, got {elapsed:?}"
        );
    }

    fn client(mock: &Arc<MockTransport>) -> AnalysisClient {
        AnalysisClient::with_transport(OllamaConfig::default(), mock.clone())
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success() {
        let mock = Arc::new(MockTransport::new(vec![MockReply::response("all good")]));

        let analysis = client(&mock).query("llama3", "prompt", 10, 3).await.unwrap();

        assert_eq!(analysis, Analysis { text: "all good".to_string(), attempts: 1 });
        assert_eq!(mock.calls(), 1);
        let sent = mock.requests();
        assert_eq!(sent[0], GenerateRequest::new("llama3", "prompt"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_nth_attempt_after_transport_failures() {
        let mock = Arc::new(MockTransport::new(vec![
            MockReply::Status(503),
            MockReply::Status(502),
            MockReply::response("third time"),
        ]));
        let start = Instant::now();

        let analysis = client(&mock).query("llama3", "prompt", 10, 3).await.unwrap();

        assert_eq!(analysis.text, "third time");
        assert_eq!(analysis.attempts, 3);
        assert_eq!(mock.calls(), 3);
        assert_elapsed(start, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_after_exactly_retry_attempts() {
        let mock = Arc::new(MockTransport::always(MockReply::Status(500)));
        let start = Instant::now();

        let err = client(&mock).query("llama3", "prompt", 10, 4).await.unwrap_err();

        match err {
            OllamaError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 4);
                assert!(matches!(*last, OllamaError::Status { status: 500, .. }));
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
        assert_eq!(mock.calls(), 4);
        // Backoff between attempts only, never after the last one
        assert_elapsed(start, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parse_failure_retries_with_backoff() {
        let mock = Arc::new(MockTransport::new(vec![
            MockReply::Body("<html>bad gateway</html>".to_string()),
            MockReply::response("recovered"),
        ]));
        let start = Instant::now();

        let analysis = client(&mock).query("llama3", "prompt", 10, 2).await.unwrap();

        assert_eq!(analysis.text, "recovered");
        assert_eq!(analysis.attempts, 2);
        assert_elapsed(start, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_response_is_success() {
        let mock = Arc::new(MockTransport::new(vec![
            MockReply::response(""),
            MockReply::response("never sent"),
        ]));

        let analysis = client(&mock).query("llama3", "prompt", 10, 2).await.unwrap();

        assert_eq!(analysis.text, "");
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_attempt_times_out() {
        let mock = Arc::new(MockTransport::new(vec![MockReply::Hang, MockReply::response("late")]));
        let start = Instant::now();

        let analysis = client(&mock).query("llama3", "prompt", 5, 2).await.unwrap();

        assert_eq!(analysis.text, "late");
        // 5s timeout + 2s backoff
        assert_elapsed(start, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_timeout_is_exhausted() {
        let mock = Arc::new(MockTransport::always(MockReply::Hang));

        let err = client(&mock).query("llama3", "prompt", 3, 1).await.unwrap_err();

        match err {
            OllamaError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 1);
                assert!(matches!(*last, OllamaError::Timeout(d) if d == Duration::from_secs(3)));
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_query_aborts_attempt_and_skips_retries() {
        let mock = Arc::new(MockTransport::always(MockReply::Hang));
        let client = client(&mock);

        // Cancelled 3s into the first 10s attempt
        let cancelled = tokio::time::timeout(
            Duration::from_secs(3),
            client.query("llama3", "prompt", 10, 3),
        )
        .await;
        assert!(cancelled.is_err());

        // Well past every remaining timeout and backoff window
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_aborted_task_makes_no_further_attempts() {
        let mock = Arc::new(MockTransport::always(MockReply::Status(503)));
        let client = client(&mock);

        let task = tokio::spawn(async move { client.query("llama3", "prompt", 10, 3).await });
        // First attempt fails immediately; abort during the 2s backoff that follows
        tokio::time::sleep(Duration::from_secs(1)).await;
        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_tries_once() {
        let mock = Arc::new(MockTransport::new(vec![MockReply::response("ok")]));

        let analysis = client(&mock).query("llama3", "prompt", 10, 0).await.unwrap();

        assert_eq!(analysis.attempts, 1);
    }

    #[tokio::test]
    async fn test_http_transport_connection_refused() {
        // Nothing listens on port 1 locally
        let config = OllamaConfig::new("http://127.0.0.1:1").with_backoff(Duration::ZERO);
        let client = AnalysisClient::new(config).unwrap();

        let err = client.query("llama3", "prompt", 2, 2).await.unwrap_err();

        match err {
            OllamaError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 2);
                assert!(last.is_transport());
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }
}
