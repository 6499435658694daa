//! Scripted transport for unit testing
//!
//! Replies are consumed in order; once the script runs out the fallback
//! reply (if any) is repeated, otherwise the attempt fails with a 500.

use crate::error::OllamaError;
use crate::models::GenerateRequest;
use crate::transport::InferenceTransport;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// One scripted outcome
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 2xx with this raw body
    Body(String),
    /// Non-2xx status
    Status(u16),
    /// Never completes; relies on the client's timeout
    Hang,
}

impl MockReply {
    /// 2xx with a valid envelope carrying `text`
    pub fn response(text: &str) -> Self {
        Self::Body(serde_json::json!({ "response": text, "done": true }).to_string())
    }
}

/// Mock transport for testing
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<MockReply>>,
    fallback: Option<MockReply>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl MockTransport {
    /// Plays `replies` in order
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    /// Returns `reply` for every attempt
    pub fn always(reply: MockReply) -> Self {
        Self {
            fallback: Some(reply),
            ..Self::default()
        }
    }

    /// Number of attempts received
    pub fn calls(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    /// Requests received, in order
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn next_reply(&self) -> MockReply {
        let scripted = self.script.lock().ok().and_then(|mut s| s.pop_front());
        scripted
            .or_else(|| self.fallback.clone())
            .unwrap_or(MockReply::Status(500))
    }
}

#[async_trait::async_trait]
impl InferenceTransport for MockTransport {
    async fn generate(&self, request: &GenerateRequest, _timeout: Duration) -> Result<String, OllamaError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        match self.next_reply() {
            MockReply::Body(body) => Ok(body),
            MockReply::Status(status) => Err(OllamaError::Status {
                status,
                body: "mock failure".to_string(),
            }),
            MockReply::Hang => std::future::pending().await,
        }
    }
}
