//! Mock LLM provider for testing
//!
//! Replies are scripted up front and handed out in call order. Every prompt
//! the provider receives is recorded so tests can assert on what was sent.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{LlmError, Result};
use crate::provider::{LlmProvider, LlmRequest, LlmResponse};

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Succeed with this content
    Content(String),
    /// Fail with an API error carrying this status and message
    Fail { status: u16, message: String },
}

impl MockReply {
    pub fn content(text: impl Into<String>) -> Self {
        Self::Content(text.into())
    }

    pub fn fail(status: u16, message: impl Into<String>) -> Self {
        Self::Fail {
            status,
            message: message.into(),
        }
    }

    fn into_result(self, model: &str) -> Result<LlmResponse> {
        match self {
            MockReply::Content(content) => Ok(LlmResponse {
                content,
                model: model.to_string(),
                usage: None,
            }),
            MockReply::Fail { status, message } => {
                Err(LlmError::from_status(status, message, None))
            }
        }
    }
}

/// A mock provider with scripted replies
pub struct MockProvider {
    /// Replies consumed front to back
    script: Mutex<VecDeque<MockReply>>,
    /// Reply used once the script runs out
    fallback: MockReply,
    /// Prompts received, in call order
    prompts: Mutex<Vec<String>>,
    call_count: AtomicUsize,
    name: &'static str,
}

impl MockProvider {
    /// Play `replies` in order, then repeat `fallback` forever
    pub fn scripted(replies: impl IntoIterator<Item = MockReply>, fallback: MockReply) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            fallback,
            prompts: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
            name: "mock",
        }
    }

    /// Create a provider that always succeeds with `response`
    pub fn always_succeeds(response: &str) -> Self {
        Self::scripted([], MockReply::content(response))
    }

    /// Create a provider that always fails with the given HTTP status
    pub fn always_fails(status: u16, message: &str) -> Self {
        Self::scripted([], MockReply::fail(status, message))
    }

    /// Get the number of times complete() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        // Record and pick the reply under one lock so concurrent callers
        // see prompts and replies paired up in the same order
        let reply = {
            let mut prompts = self
                .prompts
                .lock()
                .map_err(|_| LlmError::ConfigError("mock state poisoned".into()))?;
            prompts.push(request.prompt);
            let mut script = self
                .script
                .lock()
                .map_err(|_| LlmError::ConfigError("mock state poisoned".into()))?;
            script.pop_front().unwrap_or_else(|| self.fallback.clone())
        };

        reply.into_result("mock-model")
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_succeeds() {
        let provider = MockProvider::always_succeeds("success");

        let result = provider.complete(LlmRequest::new("test")).await;
        assert_eq!(result.unwrap().content, "success");
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.prompts(), vec!["test".to_string()]);
    }

    #[tokio::test]
    async fn test_always_fails() {
        let provider = MockProvider::always_fails(503, "overloaded");

        for _ in 0..3 {
            let result = provider.complete(LlmRequest::new("test")).await;
            assert!(matches!(result, Err(LlmError::ServerOverloaded { .. })));
        }
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_script_then_fallback() {
        let provider = MockProvider::scripted(
            [MockReply::content("first"), MockReply::fail(500, "boom")],
            MockReply::content("rest"),
        );

        let first = provider.complete(LlmRequest::new("a")).await.unwrap();
        assert_eq!(first.content, "first");

        let second = provider.complete(LlmRequest::new("b")).await;
        assert!(matches!(
            second,
            Err(LlmError::ApiError {
                status_code: Some(500),
                ..
            })
        ));

        let third = provider.complete(LlmRequest::new("c")).await.unwrap();
        assert_eq!(third.content, "rest");
        assert_eq!(provider.prompts(), vec!["a", "b", "c"]);
    }
}
