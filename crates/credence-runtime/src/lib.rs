//! # credence-runtime
//!
//! Asynchronous credibility evaluation for OCR-extracted documents.
//!
//! This crate asks a hosted reasoning service (Gemini) for a credibility
//! assessment and degrades to the deterministic scorer in `credence-core`
//! whenever the service is unconfigured, rate limited past the retry bound,
//! failing, or answering with something unusable.
//!
//! ## Guarantees
//!
//! - `evaluate` always returns an `EvaluationResult`; errors never escape
//! - Only rate-limit failures are retried (3 attempts, 5s then 10s backoff)
//! - Fallback results carry the reason in `red_flags[0]`
//! - Credentials never appear in `Debug`, `Display` or logs
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use credence_core::DocumentRecord;
//! use credence_runtime::providers::{MockOutcome, MockProvider};
//! use credence_runtime::CredibilityEvaluator;
//!
//! # tokio_test_block_on(async {
//! let provider = MockProvider::always(MockOutcome::text(
//!     "```json\n{\"total_score\": 72, \"summary\": \"Hợp lệ\"}\n```",
//! ));
//! let evaluator = CredibilityEvaluator::builder()
//!     .provider(Arc::new(provider))
//!     .build();
//!
//! let result = evaluator.evaluate(&DocumentRecord::new("INVOICE")).await;
//! assert_eq!(result.osint_score, 72);
//! assert!(result.is_credible);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

pub mod config;
pub mod orchestrator;
pub mod providers;
pub mod resilience;
pub mod telemetry;

pub use config::{ConfigError, EvaluatorConfig, GeminiSettings, ServiceConfig};
pub use orchestrator::{
    evaluate_document_credibility, CredibilityEvaluator, CredibilityEvaluatorBuilder,
    ReasoningService,
};
pub use providers::{LlmProvider, ProviderError};
pub use resilience::{FallbackReason, RetryPolicy};

#[allow(deprecated)]
pub use credence_core::legacy::check_osint;
pub use credence_core::{DocumentRecord, EvaluationResult, LegacyOsintReport};
