//! Result shapes kept for older callers.
//!
//! No new logic lives here: `LegacyOsintReport` is a reshaping of
//! `EvaluationResult`, and `check_osint` is a fixed deprecation answer.

use serde::{Deserialize, Serialize};

use crate::types::{CategoryScores, EvaluationResult};

/// Score returned by the deprecated registry check.
pub const DEPRECATED_CHECK_SCORE: u32 = 50;

/// The pre-canonical report layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyOsintReport {
    pub is_shell_company: bool,
    pub osint_score: u32,
    pub red_flags: Vec<String>,
    pub positive_signs: Vec<String>,
    pub details: LegacyDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyDetails {
    pub category_scores: CategoryScores,
    pub recommendation: String,
    pub analysis_summary: String,
    pub evaluated_by: String,
    pub doc_type: String,
}

impl From<&EvaluationResult> for LegacyOsintReport {
    fn from(result: &EvaluationResult) -> Self {
        let analysis = &result.analysis;
        Self {
            is_shell_company: result.is_shell_company,
            osint_score: result.osint_score,
            red_flags: result.red_flags.clone(),
            positive_signs: result.positive_signs.clone(),
            details: LegacyDetails {
                category_scores: analysis.scores.clone(),
                recommendation: analysis.recommendation.clone(),
                analysis_summary: analysis.summary.clone(),
                evaluated_by: analysis.evaluated_by.clone(),
                doc_type: analysis.doc_type.clone(),
            },
        }
    }
}

impl From<EvaluationResult> for LegacyOsintReport {
    fn from(result: EvaluationResult) -> Self {
        Self::from(&result)
    }
}

/// Answer of the retired tax-registry check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeprecatedOsintReport {
    pub is_shell_company: bool,
    pub osint_score: u32,
    pub red_flags: Vec<String>,
    pub details: DeprecatedDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeprecatedDetails {
    pub database_check: DatabaseCheck,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseCheck {
    pub status: String,
}

/// Retired registry lookup by tax id and name.
///
/// Performs no evaluation. Returns a neutral score and a notice pointing
/// callers at full-document evaluation.
#[deprecated(note = "submit the full OCR document to `CredibilityEvaluator::evaluate` instead")]
pub fn check_osint(_tax_id: &str, _input_name: &str) -> DeprecatedOsintReport {
    DeprecatedOsintReport {
        is_shell_company: false,
        osint_score: DEPRECATED_CHECK_SCORE,
        red_flags: vec![
            "Legacy OSINT check - Vui lòng sử dụng Gemini evaluation để có kết quả chính xác hơn"
                .to_string(),
        ],
        details: DeprecatedDetails {
            database_check: DatabaseCheck {
                status: "DEPRECATED".to_string(),
            },
            message: "Sử dụng endpoint /ai/osint với full OCR data để đánh giá bằng Gemini AI"
                .to_string(),
        },
    }
}
