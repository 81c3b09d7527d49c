//! Mock LLM Provider for testing
//!
//! Replies and failures are scripted by substring: a rule matches when its
//! needle occurs in any message of the request (system prompt included).

use crate::completion::{CompletionRequest, CompletionResponse, TokenUsage};
use crate::error::{Error, Result};
use crate::provider::LlmProvider;

use std::sync::Mutex;
use std::time::Duration;

const MOCK_MODEL: &str = "mock-model";

/// A scriptable mock provider that records every request it receives.
pub struct MockProvider {
    name: String,
    default_reply: String,
    replies: Vec<(String, String)>,
    failures: Vec<String>,
    fail_all: bool,
    latency: Option<Duration>,
    usage: TokenUsage,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Create a new mock provider named "mock".
    #[must_use]
    pub fn new() -> Self {
        Self::named("mock")
    }

    /// Create a mock provider with a custom name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_reply: "mock response".to_string(),
            replies: Vec::new(),
            failures: Vec::new(),
            fail_all: false,
            latency: None,
            usage: TokenUsage::new(10, 5),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reply used when no rule matches.
    #[must_use]
    pub fn with_default_reply(mut self, reply: impl Into<String>) -> Self {
        self.default_reply = reply.into();
        self
    }

    /// Reply with `reply` when `needle` occurs in the request.
    #[must_use]
    pub fn with_reply(mut self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.replies.push((needle.into(), reply.into()));
        self
    }

    /// Fail when `needle` occurs in the request. Failures win over replies.
    #[must_use]
    pub fn failing_on(mut self, needle: impl Into<String>) -> Self {
        self.failures.push(needle.into());
        self
    }

    /// Fail every request.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Sleep before answering.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Usage reported for each successful call.
    #[must_use]
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Requests received so far, in arrival order.
    #[must_use]
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn matches(request: &CompletionRequest, needle: &str) -> bool {
        request.messages.iter().any(|m| m.content.contains(needle))
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_model(&self) -> &str {
        MOCK_MODEL
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.fail_all || self.failures.iter().any(|n| Self::matches(&request, n)) {
            return Err(Error::Api("mock failure".to_string()));
        }

        let content = self
            .replies
            .iter()
            .find(|(needle, _)| Self::matches(&request, needle))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.default_reply.clone());

        let model = if request.model.is_empty() {
            MOCK_MODEL.to_string()
        } else {
            request.model.clone()
        };

        Ok(CompletionResponse {
            content,
            usage: Some(self.usage),
            finish_reason: Some("stop".to_string()),
            model,
        })
    }
}
