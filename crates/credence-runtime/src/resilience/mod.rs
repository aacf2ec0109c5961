//! Resilience patterns for credence-runtime.
//!
//! This module provides:
//! - Retry with exponential backoff, for rate-limit failures only
//! - Typed reasons for falling back to the local evaluator

mod fallback;
mod retry;

pub use fallback::FallbackReason;
pub use retry::{RetryPolicy, DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};
