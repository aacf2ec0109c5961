//! JSON Schema validation for reasoning-service answers.
//!
//! Answers are validated against `schema/assessment.schema.json`. Every
//! field is optional; present fields must have the right type, and
//! `total_score` must lie in 0..=100. Sub-score arithmetic is not checked.

use std::sync::OnceLock;

/// Embedded assessment schema (loaded at compile time).
const ASSESSMENT_SCHEMA_JSON: &str = include_str!("../../schema/assessment.schema.json");

/// Compiled validator (initialized once, reused).
static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

fn get_validator() -> Result<&'static jsonschema::Validator, String> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let schema_value: serde_json::Value = serde_json::from_str(ASSESSMENT_SCHEMA_JSON)
            .map_err(|e| format!("Invalid schema JSON: {}", e))?;

        jsonschema::options()
            .build(&schema_value)
            .map_err(|e| format!("Failed to compile schema: {}", e))
    });

    result.as_ref().map_err(Clone::clone)
}

/// Validate a parsed answer against the assessment schema.
///
/// Returns the list of violations, each with its instance path.
pub fn validate_assessment(value: &serde_json::Value) -> Result<(), Vec<String>> {
    let validator = get_validator().map_err(|e| vec![e])?;

    let errors: Vec<String> = validator
        .iter_errors(value)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_complete_answer_passes() {
        let value = json!({
            "total_score": 72,
            "is_credible": true,
            "scores": {"completeness": 20, "validity": 18, "consistency": 17, "no_fraud_signs": 17},
            "red_flags": [],
            "positive_signs": ["Có mã số thuế"],
            "summary": "Ổn",
            "recommendation": "CHẤP NHẬN"
        });
        assert!(validate_assessment(&value).is_ok());
    }

    #[test]
    fn test_empty_object_passes() {
        assert!(validate_assessment(&json!({})).is_ok());
    }

    #[test]
    fn test_non_object_fails() {
        assert!(validate_assessment(&json!([1, 2, 3])).is_err());
        assert!(validate_assessment(&json!("72")).is_err());
    }

    #[test]
    fn test_out_of_range_total_fails() {
        assert!(validate_assessment(&json!({"total_score": 140})).is_err());
        assert!(validate_assessment(&json!({"total_score": -1})).is_err());
    }

    #[test]
    fn test_wrong_types_fail() {
        let errors = validate_assessment(&json!({
            "total_score": "seventy",
            "red_flags": "none"
        }))
        .unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_sub_score_sum_is_not_checked() {
        let value = json!({
            "total_score": 90,
            "scores": {"completeness": 5, "validity": 5, "consistency": 5, "no_fraud_signs": 5}
        });
        assert!(validate_assessment(&value).is_ok());
    }
}
