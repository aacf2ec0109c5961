//! Bounded retry with exponential backoff.

use backon::ExponentialBuilder;
use serde::Deserialize;
use std::time::Duration;

/// Attempts made when nothing else is configured.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Delay before the first retry; doubled for each later one.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(5);

/// Upper bound on a single call to the reasoning service.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);

/// How often, and how patiently, the reasoning service is called.
///
/// Only rate-limit failures are retried. With the defaults a quota error is
/// retried twice, after 5s and then 10s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total calls allowed, including the first
    pub max_attempts: u32,

    /// Delay before the first retry
    #[serde(with = "duration_text")]
    pub base_delay: Duration,

    /// Bound on each individual call
    #[serde(with = "duration_text")]
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    /// Whether the policy allows any call at all.
    pub fn allows_calls(&self) -> bool {
        self.max_attempts > 0
    }

    /// Number of retries after the first attempt.
    pub fn retries(&self) -> usize {
        self.max_attempts.saturating_sub(1) as usize
    }

    /// Delay slept before retry number `retry` (0-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(retry))
    }

    /// Backoff schedule: `base_delay * 2^n`, no jitter.
    pub fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_max_delay(self.delay_for(self.retries() as u32))
            .with_factor(2.0)
            .with_max_times(self.retries())
    }
}

/// Durations in config files are written as `"5s"`, `"1m 30s"`.
mod duration_text {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}
