//! Scripted provider for tests.
//!
//! Returns pre-configured outcomes without any network calls and records
//! every call, including the (tokio) instant it happened, so retry pacing
//! can be asserted under a paused clock.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::time::Instant;

use super::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError, TokenUsage,
};

/// What a mock call returns.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOutcome {
    /// Succeed with this text body
    Text(String),
    /// Fail with this error
    Error(ProviderError),
}

impl MockOutcome {
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text(body.into())
    }

    pub fn rate_limited() -> Self {
        Self::Error(ProviderError::RateLimited { retry_after: None })
    }
}

/// A recorded call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub at: Instant,
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

/// Deterministic provider for testing.
///
/// Outcomes are served in order; once the script runs out the last outcome
/// repeats. Clones share the script and the call log.
///
/// ```
/// use credence_runtime::providers::{MockOutcome, MockProvider};
///
/// let provider = MockProvider::scripted(vec![
///     MockOutcome::rate_limited(),
///     MockOutcome::text(r#"{"total_score": 70}"#),
/// ]);
/// assert_eq!(provider.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    script: Arc<Mutex<VecDeque<MockOutcome>>>,
    last: Arc<Mutex<MockOutcome>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
    provenance: String,
    usage: TokenUsage,
}

impl MockProvider {
    /// Always return the same outcome.
    pub fn always(outcome: MockOutcome) -> Self {
        Self::scripted(vec![outcome])
    }

    /// Serve outcomes in order, repeating the last one.
    pub fn scripted(outcomes: Vec<MockOutcome>) -> Self {
        let last = outcomes.last().cloned().unwrap_or_else(|| {
            MockOutcome::Error(ProviderError::NotConfigured("empty mock script".to_string()))
        });
        Self {
            script: Arc::new(Mutex::new(outcomes.into())),
            last: Arc::new(Mutex::new(last)),
            calls: Arc::new(Mutex::new(Vec::new())),
            provenance: "Mock AI".to_string(),
            usage: TokenUsage::default(),
        }
    }

    /// Override the provenance tag.
    pub fn with_provenance(mut self, provenance: impl Into<String>) -> Self {
        self.provenance = provenance.into();
        self
    }

    /// Report this usage on every successful call.
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Number of `complete` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// All recorded calls, oldest first.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Gaps between consecutive calls.
    pub fn call_gaps(&self) -> Vec<std::time::Duration> {
        let calls = self.calls.lock();
        calls.windows(2).map(|w| w[1].at - w[0].at).collect()
    }

    fn next_outcome(&self) -> MockOutcome {
        match self.script.lock().pop_front() {
            Some(outcome) => {
                *self.last.lock() = outcome.clone();
                outcome
            }
            None => self.last.lock().clone(),
        }
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        self.calls.lock().push(MockCall {
            at: Instant::now(),
            model: config.model.clone(),
            messages,
        });

        match self.next_outcome() {
            MockOutcome::Text(body) => Ok(CompletionResponse {
                usage: self.usage.clone(),
                ..CompletionResponse::text(body, config.model.clone())
            }),
            MockOutcome::Error(error) => Err(error),
        }
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn provenance(&self) -> &str {
        &self.provenance
    }
}
