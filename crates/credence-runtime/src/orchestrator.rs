//! Evaluation orchestrator.
//!
//! The orchestrator owns the retry state machine around the reasoning
//! service:
//! - Unconfigured service: straight to the fallback evaluator
//! - Rate limited: retried with exponential backoff, bounded attempts
//! - Any other failure, including a malformed answer: fallback at once
//!
//! `evaluate` never fails. Every error ends in a fallback result whose first
//! red flag says why.

use std::sync::Arc;

use backon::Retryable;
use thiserror::Error;

use credence_core::{
    build_prompt, normalize, parse_response, DocumentRecord, EvaluationResult, FallbackEvaluator,
    LegacyOsintReport, ResponseError,
};

use crate::config::{ConfigError, EvaluatorConfig, GeminiSettings, ServiceConfig};
use crate::providers::{ChatMessage, CompletionConfig, LlmProvider, ProviderError, TokenUsage};
use crate::resilience::{FallbackReason, RetryPolicy};

/// Why a single attempt did not produce a result.
#[derive(Error, Debug)]
enum AttemptError {
    #[error(transparent)]
    Provider(ProviderError),

    #[error(transparent)]
    Malformed(ResponseError),
}

impl AttemptError {
    fn is_retryable(&self) -> bool {
        matches!(self, AttemptError::Provider(e) if e.is_rate_limited())
    }

    fn into_reason(self) -> FallbackReason {
        match self {
            AttemptError::Provider(e) if e.is_rate_limited() => FallbackReason::QuotaExhausted,
            AttemptError::Provider(ProviderError::NotConfigured(_)) => {
                FallbackReason::NotConfigured
            }
            AttemptError::Provider(e) => FallbackReason::ServiceError(e.to_string()),
            AttemptError::Malformed(e) => FallbackReason::MalformedResponse(e.to_string()),
        }
    }
}

/// The reasoning service the evaluator may consult.
#[derive(Clone)]
pub enum ReasoningService {
    /// Fallback-only mode
    Unconfigured,

    Available {
        provider: Arc<dyn LlmProvider>,
        completion: CompletionConfig,
    },
}

impl std::fmt::Debug for ReasoningService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReasoningService::Unconfigured => write!(f, "Unconfigured"),
            ReasoningService::Available { provider, completion } => f
                .debug_struct("Available")
                .field("provider", &provider.name())
                .field("model", &completion.model)
                .finish(),
        }
    }
}

/// Evaluates document credibility, consulting the reasoning service when
/// one is configured and falling back to local rules otherwise.
///
/// Holds only immutable configuration, so one instance can serve
/// concurrent evaluations.
#[derive(Debug, Clone)]
pub struct CredibilityEvaluator {
    service: ReasoningService,
    policy: RetryPolicy,
    fallback: FallbackEvaluator,
}

impl CredibilityEvaluator {
    /// An evaluator that never calls out.
    pub fn unconfigured() -> Self {
        CredibilityEvaluatorBuilder::new().build()
    }

    /// Start building an evaluator.
    pub fn builder() -> CredibilityEvaluatorBuilder {
        CredibilityEvaluatorBuilder::new()
    }

    /// Build from loaded configuration.
    pub fn from_config(config: EvaluatorConfig) -> Self {
        let completion = CompletionConfig {
            max_tokens: config.max_output_tokens,
            timeout: config.retry.attempt_timeout,
            ..Default::default()
        };
        let builder = Self::builder().policy(config.retry);

        match config.service {
            ServiceConfig::Unconfigured => builder.build(),
            ServiceConfig::Gemini(settings) => {
                let completion = CompletionConfig {
                    model: settings.model.clone(),
                    ..completion
                };
                match connect_gemini(settings) {
                    Some(provider) => builder.provider(provider).completion(completion).build(),
                    None => builder.build(),
                }
            }
        }
    }

    /// Load configuration from the environment (and `.env`) and build.
    pub fn from_env() -> Result<Self, ConfigError> {
        EvaluatorConfig::from_env().map(Self::from_config)
    }

    /// Whether a reasoning service is configured.
    pub fn is_configured(&self) -> bool {
        matches!(self.service, ReasoningService::Available { .. })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Evaluate one document. Never fails.
    pub async fn evaluate(&self, document: &DocumentRecord) -> EvaluationResult {
        let ReasoningService::Available { provider, completion } = &self.service else {
            return self.fall_back(document, FallbackReason::NotConfigured);
        };

        if !self.policy.allows_calls() {
            return self.fall_back(document, FallbackReason::RetriesExhausted);
        }

        let prompt = build_prompt(document);
        let prompt = prompt.as_str();
        let doc_type = document.doc_type.as_str();
        let provider = provider.as_ref();
        let mut attempts = 0u32;

        let outcome = (|| {
            attempts += 1;
            self.attempt(provider, completion, prompt, doc_type, attempts)
        })
        .retry(self.policy.backoff())
        .sleep(tokio::time::sleep)
        .when(AttemptError::is_retryable)
        .notify(|error: &AttemptError, delay| {
            tracing::warn!(
                doc_type = %document.doc_type,
                error = %error,
                delay = ?delay,
                "Reasoning service rate limited, backing off"
            );
        })
        .await;

        match outcome {
            Ok((result, usage)) => {
                tracing::info!(
                    doc_type = %document.doc_type,
                    score = result.osint_score,
                    attempts,
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "Reasoning service evaluation complete"
                );
                result
            }
            Err(error) => self.fall_back(document, error.into_reason()),
        }
    }

    /// Evaluate and reshape into the older report layout.
    pub async fn check_osint_legacy(&self, document: &DocumentRecord) -> LegacyOsintReport {
        LegacyOsintReport::from(self.evaluate(document).await)
    }

    async fn attempt(
        &self,
        provider: &dyn LlmProvider,
        completion: &CompletionConfig,
        prompt: &str,
        doc_type: &str,
        attempt: u32,
    ) -> Result<(EvaluationResult, TokenUsage), AttemptError> {
        tracing::info!(
            doc_type,
            attempt,
            provider = provider.name(),
            model = %completion.model,
            "Calling reasoning service"
        );

        let call = provider.complete(vec![ChatMessage::user(prompt)], completion);
        let response = match tokio::time::timeout(self.policy.attempt_timeout, call).await {
            Ok(response) => response.map_err(AttemptError::Provider)?,
            Err(_) => {
                return Err(AttemptError::Provider(ProviderError::Timeout(
                    self.policy.attempt_timeout,
                )))
            }
        };

        let assessment = parse_response(&response.content).map_err(|e| {
            tracing::warn!(doc_type, attempt, error = %e, "Reasoning service answer rejected");
            AttemptError::Malformed(e)
        })?;

        let result = normalize(assessment, doc_type, provider.provenance());
        Ok((result, response.usage))
    }

    fn fall_back(&self, document: &DocumentRecord, reason: FallbackReason) -> EvaluationResult {
        let result = self.fallback.evaluate(document, &reason.to_string());
        tracing::warn!(
            doc_type = %document.doc_type,
            reason = reason.kind(),
            detail = %reason,
            score = result.osint_score,
            "Using fallback evaluator"
        );
        result
    }
}

impl Default for CredibilityEvaluator {
    fn default() -> Self {
        Self::unconfigured()
    }
}

/// Primary entry point for the document pipeline.
pub async fn evaluate_document_credibility(
    evaluator: &CredibilityEvaluator,
    document: &DocumentRecord,
) -> EvaluationResult {
    evaluator.evaluate(document).await
}

#[cfg(feature = "gemini")]
fn connect_gemini(settings: GeminiSettings) -> Option<Arc<dyn LlmProvider>> {
    use crate::providers::GeminiProvider;

    Some(Arc::new(
        GeminiProvider::with_credential(settings.credential).with_base_url(settings.base_url),
    ))
}

#[cfg(not(feature = "gemini"))]
fn connect_gemini(_settings: GeminiSettings) -> Option<Arc<dyn LlmProvider>> {
    tracing::warn!("Gemini configured but the `gemini` feature is disabled; using fallback only");
    None
}

/// Builder for CredibilityEvaluator.
pub struct CredibilityEvaluatorBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    completion: CompletionConfig,
    policy: RetryPolicy,
}

impl CredibilityEvaluatorBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            provider: None,
            completion: CompletionConfig::default(),
            policy: RetryPolicy::default(),
        }
    }

    /// Set the reasoning service provider.
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the completion parameters.
    pub fn completion(mut self, completion: CompletionConfig) -> Self {
        self.completion = completion;
        self
    }

    /// Set the retry policy.
    pub fn policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the evaluator. Without a provider it runs in fallback-only mode.
    pub fn build(self) -> CredibilityEvaluator {
        let service = match self.provider {
            Some(provider) => ReasoningService::Available {
                provider,
                completion: self.completion,
            },
            None => ReasoningService::Unconfigured,
        };

        CredibilityEvaluator {
            service,
            policy: self.policy,
            fallback: FallbackEvaluator::new(),
        }
    }
}

impl Default for CredibilityEvaluatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
