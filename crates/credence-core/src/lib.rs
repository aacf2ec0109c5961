//! # credence-core
//!
//! Deterministic building blocks for document credibility evaluation.
//!
//! This crate holds everything that does not touch the network:
//! - **Data model**: `DocumentRecord` in, `EvaluationResult` out
//! - **Prompt builder**: renders a document into the reasoning-service prompt
//! - **Response normaliser**: fence stripping, parsing, shape checks, defaults
//! - **Fallback evaluator**: rule-based scoring used when the service is unavailable
//! - **Legacy shapes**: older report layouts kept for existing callers
//!
//! ## Key Guarantees
//!
//! 1. **No I/O**: nothing here performs network calls or sleeps
//! 2. **Deterministic**: the prompt and the fallback result depend only on the input
//! 3. **Bounded**: every result produced here has `0 <= osint_score <= 100`
//! 4. **Mirrored**: `is_shell_company == !is_credible` on every result
//!
//! ## Example
//!
//! ```rust
//! use credence_core::{DocumentRecord, FallbackEvaluator};
//!
//! let doc = DocumentRecord::from_json(r#"{"doc_type": "INVOICE"}"#).unwrap();
//! let result = FallbackEvaluator::new().evaluate(&doc, "service not configured");
//!
//! assert_eq!(result.osint_score, 48);
//! assert!(!result.is_credible);
//! ```

pub mod fallback;
pub mod legacy;
pub mod patterns;
pub mod prompt;
pub mod response;
pub mod types;

// Re-export main types at crate root
pub use fallback::{FallbackEvaluator, FALLBACK_EVALUATOR_NAME, FALLBACK_MARKER_PREFIX};
pub use legacy::{DeprecatedOsintReport, LegacyOsintReport};
pub use prompt::build_prompt;
pub use response::{normalize, parse_response, ResponseError, ServiceAssessment};
pub use types::{
    Analysis, CategoryScores, Debtor, DocumentRecord, EvaluationResult, ScoreBand,
    CREDIBILITY_THRESHOLD, UNKNOWN_DOC_TYPE,
};
