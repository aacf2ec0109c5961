//! Evaluator configuration.
//!
//! Configuration is an explicit value handed to the evaluator at
//! construction. A missing credential is not an error: it selects
//! [`ServiceConfig::Unconfigured`], in which every evaluation uses the local
//! fallback scorer.

use serde::Deserialize;
use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::providers::{
    ApiCredential, CredentialSource, DEFAULT_MODEL, GEMINI_API_KEY_ENV, GEMINI_DEFAULT_BASE_URL,
};
use crate::resilience::RetryPolicy;

/// Environment variable holding the Gemini API key.
pub const API_KEY_VAR: &str = GEMINI_API_KEY_ENV;
/// Environment variable selecting the Gemini model.
pub const MODEL_VAR: &str = "GEMINI_MODEL";
/// Environment variable overriding the Gemini API root.
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";
/// Environment variable bounding each call, as a humantime duration.
pub const TIMEOUT_VAR: &str = "GEMINI_TIMEOUT";
/// Environment variable for the total number of calls per evaluation.
pub const MAX_RETRIES_VAR: &str = "CREDENCE_MAX_RETRIES";
/// Environment variable for the first backoff delay.
pub const RETRY_DELAY_VAR: &str = "CREDENCE_RETRY_DELAY";
/// Environment variable for the default log filter.
pub const LOG_LEVEL_VAR: &str = "CREDENCE_LOG_LEVEL";

const CREDENTIAL_NAME: &str = "Gemini API key";
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var} must be a duration such as \"5s\" or \"1m\", got {value:?}")]
    InvalidDuration {
        var: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },

    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Connection settings for Gemini.
#[derive(Debug)]
pub struct GeminiSettings {
    pub credential: ApiCredential,
    pub model: String,
    pub base_url: String,
}

/// Which reasoning service, if any, the evaluator may call.
#[derive(Debug, Default)]
pub enum ServiceConfig {
    /// No credential: fallback-only mode
    #[default]
    Unconfigured,
    Gemini(GeminiSettings),
}

impl ServiceConfig {
    pub fn is_configured(&self) -> bool {
        !matches!(self, ServiceConfig::Unconfigured)
    }
}

/// Top-level configuration for the evaluator.
#[derive(Debug)]
pub struct EvaluatorConfig {
    pub service: ServiceConfig,
    pub retry: RetryPolicy,
    pub max_output_tokens: u32,
    pub log_level: String,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::Unconfigured,
            retry: RetryPolicy::default(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl EvaluatorConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from any key lookup (environment, test map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = RetryPolicy::default();

        let mut retry = RetryPolicy {
            max_attempts: match get(MAX_RETRIES_VAR) {
                Some(value) => parse_number(MAX_RETRIES_VAR, &value)?,
                None => defaults.max_attempts,
            },
            base_delay: match get(RETRY_DELAY_VAR) {
                Some(value) => parse_duration(RETRY_DELAY_VAR, &value)?,
                None => defaults.base_delay,
            },
            attempt_timeout: defaults.attempt_timeout,
        };
        if let Some(value) = get(TIMEOUT_VAR) {
            retry.attempt_timeout = parse_duration(TIMEOUT_VAR, &value)?;
        }
        if retry.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }

        let service = match get(API_KEY_VAR) {
            Some(key) => ServiceConfig::Gemini(GeminiSettings {
                credential: gemini_key(&key, CredentialSource::Environment),
                model: get(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: get(BASE_URL_VAR).unwrap_or_else(|| GEMINI_DEFAULT_BASE_URL.to_string()),
            }),
            None => ServiceConfig::Unconfigured,
        };

        Ok(Self {
            service,
            retry,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            log_level: get(LOG_LEVEL_VAR).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }

    /// Load from YAML. A missing `gemini.api_key` is taken from
    /// `GEMINI_API_KEY`.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Self::from_yaml_with(yaml, |key| env::var(key).ok())
    }

    fn from_yaml_with<F>(yaml: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file: ConfigFile = serde_yaml::from_str(yaml)?;
        if file.retry.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }

        let gemini = file.gemini;
        let credential = match gemini.api_key.filter(|k| !k.trim().is_empty()) {
            Some(key) => Some(gemini_key(&key, CredentialSource::Config)),
            None => lookup(API_KEY_VAR)
                .filter(|k| !k.trim().is_empty())
                .map(|k| gemini_key(&k, CredentialSource::Environment)),
        };

        let service = match credential {
            Some(credential) => ServiceConfig::Gemini(GeminiSettings {
                credential,
                model: gemini.model,
                base_url: gemini.base_url,
            }),
            None => ServiceConfig::Unconfigured,
        };

        Ok(Self {
            service,
            retry: file.retry,
            max_output_tokens: file.max_output_tokens,
            log_level: file.log_level,
        })
    }

    /// Per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.retry.attempt_timeout
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ConfigFile {
    gemini: GeminiSection,
    retry: RetryPolicy,
    max_output_tokens: u32,
    log_level: String,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            gemini: GeminiSection::default(),
            retry: RetryPolicy::default(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct GeminiSection {
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl Default for GeminiSection {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_DEFAULT_BASE_URL.to_string(),
        }
    }
}

fn gemini_key(raw: &str, source: CredentialSource) -> ApiCredential {
    ApiCredential::new(raw.trim(), source, CREDENTIAL_NAME)
}

fn parse_duration(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value.trim()).map_err(|source| ConfigError::InvalidDuration {
        var,
        value: value.to_string(),
        source,
    })
}

fn parse_number(var: &'static str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = EvaluatorConfig::from_lookup(lookup(&[])).unwrap();
        assert!(!config.service.is_configured());
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn api_key_selects_gemini_with_default_model() {
        let config = EvaluatorConfig::from_lookup(lookup(&[(API_KEY_VAR, " AIza-test ")])).unwrap();
        let ServiceConfig::Gemini(settings) = config.service else {
            panic!("expected gemini service");
        };
        assert_eq!(settings.credential.expose(), "AIza-test");
        assert_eq!(settings.credential.source(), CredentialSource::Environment);
        assert_eq!(settings.model, "gemini-1.5-flash");
        assert_eq!(settings.base_url, GEMINI_DEFAULT_BASE_URL);
    }

    #[test]
    fn blank_api_key_is_unconfigured() {
        let config = EvaluatorConfig::from_lookup(lookup(&[(API_KEY_VAR, "   ")])).unwrap();
        assert!(!config.service.is_configured());
    }

    #[test]
    fn retry_knobs_are_read() {
        let config = EvaluatorConfig::from_lookup(lookup(&[
            (MAX_RETRIES_VAR, "5"),
            (RETRY_DELAY_VAR, "2s"),
            (TIMEOUT_VAR, "45s"),
            (MODEL_VAR, "gemini-2.0-flash"),
        ]))
        .unwrap();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay, Duration::from_secs(2));
        assert_eq!(config.retry.attempt_timeout, Duration::from_secs(45));
    }

    #[test]
    fn bad_duration_is_rejected() {
        let err = EvaluatorConfig::from_lookup(lookup(&[(RETRY_DELAY_VAR, "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDuration { var: RETRY_DELAY_VAR, .. }));
    }

    #[test]
    fn bad_and_zero_attempts_are_rejected() {
        let err = EvaluatorConfig::from_lookup(lookup(&[(MAX_RETRIES_VAR, "three")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));

        let err = EvaluatorConfig::from_lookup(lookup(&[(MAX_RETRIES_VAR, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroAttempts));
    }

    #[test]
    fn yaml_with_inline_key() {
        let yaml = r#"
gemini:
  api_key: AIza-from-file
  model: gemini-2.0-flash
retry:
  max_attempts: 2
  base_delay: 1s
log_level: debug
"#;
        let config = EvaluatorConfig::from_yaml_with(yaml, lookup(&[])).unwrap();
        let ServiceConfig::Gemini(settings) = &config.service else {
            panic!("expected gemini service");
        };
        assert_eq!(settings.credential.source(), CredentialSource::Config);
        assert_eq!(settings.model, "gemini-2.0-flash");
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.base_delay, Duration::from_secs(1));
        assert_eq!(config.retry.attempt_timeout, Duration::from_secs(30));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn yaml_key_falls_back_to_env() {
        let env = lookup(&[(API_KEY_VAR, "AIza-env")]);
        let config = EvaluatorConfig::from_yaml_with("retry:\n  max_attempts: 3\n", env).unwrap();
        let ServiceConfig::Gemini(settings) = &config.service else {
            panic!("expected gemini service");
        };
        assert_eq!(settings.credential.expose(), "AIza-env");
        assert_eq!(settings.model, DEFAULT_MODEL);
    }

    #[test]
    fn yaml_without_any_key_is_unconfigured() {
        let config = EvaluatorConfig::from_yaml_with("log_level: warn\n", lookup(&[])).unwrap();
        assert!(!config.service.is_configured());
    }

    #[test]
    fn yaml_zero_attempts_rejected() {
        let err = EvaluatorConfig::from_yaml_with("retry:\n  max_attempts: 0\n", lookup(&[]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroAttempts));
    }

    #[test]
    fn yaml_syntax_error() {
        let err = EvaluatorConfig::from_yaml_with("gemini: [unclosed", lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn from_env_reads_process_environment() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        env::set_var(MAX_RETRIES_VAR, "4");
        let config = EvaluatorConfig::from_env().expect("config loads");
        env::remove_var(MAX_RETRIES_VAR);
        assert_eq!(config.retry.max_attempts, 4);
    }

    #[test]
    fn credential_not_in_debug() {
        let config =
            EvaluatorConfig::from_lookup(lookup(&[(API_KEY_VAR, "AIza-secret-123")])).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("AIza-secret-123"));
    }
}
