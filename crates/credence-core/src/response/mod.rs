//! Parsing and normalisation of reasoning-service answers.
//!
//! The service is asked for a bare JSON object but often wraps it in a
//! Markdown fence. `parse_response` strips the fence, parses, and checks the
//! shape; `normalize` turns the untrusted assessment into an
//! `EvaluationResult`, filling defaults for anything missing.

mod schema;

pub use schema::validate_assessment;

use serde::Deserialize;
use thiserror::Error;

use crate::patterns::strip_code_fences;
use crate::types::{meets_threshold, Analysis, CategoryScores, EvaluationResult};

/// Score assumed when the service omits `total_score`.
pub const DEFAULT_SERVICE_SCORE: u32 = 50;

/// Errors from parsing a service answer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResponseError {
    #[error("Response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Response does not match the assessment schema: {}", .0.join("; "))]
    SchemaViolation(Vec<String>),
}

/// An assessment as reported by the reasoning service. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServiceAssessment {
    #[serde(default)]
    pub total_score: Option<f64>,

    #[serde(default)]
    pub is_credible: Option<bool>,

    #[serde(default)]
    pub scores: ServiceScores,

    #[serde(default)]
    pub red_flags: Vec<String>,

    #[serde(default)]
    pub positive_signs: Vec<String>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub recommendation: Option<String>,
}

/// Sub-scores as reported. Numbers may arrive as `18` or `18.0`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServiceScores {
    #[serde(default)]
    pub completeness: Option<f64>,

    #[serde(default)]
    pub validity: Option<f64>,

    #[serde(default)]
    pub consistency: Option<f64>,

    #[serde(default)]
    pub no_fraud_signs: Option<f64>,
}

impl From<ServiceScores> for CategoryScores {
    fn from(scores: ServiceScores) -> Self {
        Self {
            completeness: scores.completeness.map(whole),
            validity: scores.validity.map(whole),
            consistency: scores.consistency.map(whole),
            no_fraud_signs: scores.no_fraud_signs.map(whole),
        }
    }
}

/// Schema-checked numbers are integral and non-negative.
fn whole(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

/// Parse a raw service answer: strip fences, parse JSON, check the shape.
pub fn parse_response(text: &str) -> Result<ServiceAssessment, ResponseError> {
    let body = strip_code_fences(text);

    let value: serde_json::Value =
        serde_json::from_str(&body).map_err(|e| ResponseError::InvalidJson(e.to_string()))?;

    validate_assessment(&value).map_err(ResponseError::SchemaViolation)?;

    serde_json::from_value(value).map_err(|e| ResponseError::SchemaViolation(vec![e.to_string()]))
}

/// Convert a service assessment into the canonical result.
///
/// The service's `is_credible` is taken as given, even when it disagrees
/// with the threshold applied to `total_score`. Sub-scores are copied
/// without checking that they add up to the total.
pub fn normalize(
    assessment: ServiceAssessment,
    doc_type: &str,
    evaluated_by: &str,
) -> EvaluationResult {
    let total_score = assessment
        .total_score
        .map(whole)
        .unwrap_or(DEFAULT_SERVICE_SCORE);
    let derived = meets_threshold(total_score);

    let is_credible = match assessment.is_credible {
        Some(reported) => {
            if reported != derived {
                tracing::warn!(
                    score = total_score,
                    reported,
                    derived,
                    "Service credibility verdict disagrees with its score"
                );
            }
            reported
        }
        None => derived,
    };

    EvaluationResult::new(
        total_score,
        is_credible,
        assessment.red_flags,
        assessment.positive_signs,
        Analysis {
            scores: assessment.scores.into(),
            summary: assessment.summary.unwrap_or_default(),
            recommendation: assessment.recommendation.unwrap_or_default(),
            evaluated_by: evaluated_by.to_string(),
            doc_type: doc_type.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_ANSWER: &str = r#"{
        "total_score": 72,
        "is_credible": true,
        "scores": {"completeness": 20, "validity": 18, "consistency": 17, "no_fraud_signs": 17},
        "red_flags": ["Địa chỉ không khớp vùng biển số"],
        "positive_signs": ["Có mã số thuế hợp lệ"],
        "summary": "Tài liệu tương đối đáng tin cậy.",
        "recommendation": "CẦN XEM XÉT - xác minh địa chỉ"
    }"#;

    #[test]
    fn test_parse_plain_json() {
        let assessment = parse_response(FULL_ANSWER).unwrap();
        assert_eq!(assessment.total_score, Some(72.0));
        assert_eq!(assessment.red_flags.len(), 1);
    }

    #[test]
    fn test_parse_json_fence() {
        let fenced = format!("```json\n{}\n```", FULL_ANSWER);
        let assessment = parse_response(&fenced).unwrap();
        assert_eq!(assessment.total_score, Some(72.0));
        assert_eq!(assessment.scores.validity, Some(18.0));
    }

    #[test]
    fn test_parse_bare_fence() {
        let fenced = format!("```\n{}\n```", FULL_ANSWER);
        assert!(parse_response(&fenced).is_ok());
    }

    #[test]
    fn test_parse_rejects_prose() {
        let result = parse_response("Tài liệu này có vẻ đáng tin cậy.");
        assert!(matches!(result, Err(ResponseError::InvalidJson(_))));
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        let result = parse_response(r#"{"total_score": "high"}"#);
        assert!(matches!(result, Err(ResponseError::SchemaViolation(_))));

        let result = parse_response("[72]");
        assert!(matches!(result, Err(ResponseError::SchemaViolation(_))));
    }

    #[test]
    fn test_normalize_full_answer() {
        let result = normalize(parse_response(FULL_ANSWER).unwrap(), "INVOICE", "Gemini AI");

        assert_eq!(result.osint_score, 72);
        assert!(result.is_credible);
        assert!(!result.is_shell_company);
        assert_eq!(result.analysis.scores, CategoryScores::full(20, 18, 17, 17));
        assert_eq!(result.analysis.evaluated_by, "Gemini AI");
        assert_eq!(result.analysis.doc_type, "INVOICE");
        assert_eq!(result.analysis.summary, "Tài liệu tương đối đáng tin cậy.");
    }

    #[test]
    fn test_normalize_defaults() {
        let result = normalize(ServiceAssessment::default(), "UNKNOWN", "Gemini AI");

        assert_eq!(result.osint_score, DEFAULT_SERVICE_SCORE);
        assert!(!result.is_credible);
        assert!(result.is_shell_company);
        assert!(result.red_flags.is_empty());
        assert!(result.positive_signs.is_empty());
        assert!(result.analysis.scores.is_empty());
        assert_eq!(result.analysis.summary, "");
        assert_eq!(result.analysis.recommendation, "");
    }

    #[test]
    fn test_normalize_derives_credibility_from_score() {
        let assessment = parse_response(r#"{"total_score": 60}"#).unwrap();
        assert!(normalize(assessment, "INVOICE", "Gemini AI").is_credible);

        let assessment = parse_response(r#"{"total_score": 59}"#).unwrap();
        assert!(!normalize(assessment, "INVOICE", "Gemini AI").is_credible);
    }

    #[test]
    fn test_normalize_trusts_reported_verdict() {
        let assessment = parse_response(r#"{"total_score": 85, "is_credible": false}"#).unwrap();
        let result = normalize(assessment, "INVOICE", "Gemini AI");

        assert_eq!(result.osint_score, 85);
        assert!(!result.is_credible);
        assert!(result.is_shell_company);
    }

    #[test]
    fn test_normalize_accepts_float_scores() {
        let assessment =
            parse_response(r#"{"total_score": 64.0, "scores": {"validity": 20.0}}"#).unwrap();
        let result = normalize(assessment, "INVOICE", "Gemini AI");
        assert_eq!(result.osint_score, 64);
        assert_eq!(result.analysis.scores.validity, Some(20));
    }
}
