//! Rule-based fallback evaluator.
//!
//! Scores a document from its local fields alone when the reasoning service
//! is unconfigured, unreachable, or out of quota.
//!
//! ## Scoring
//!
//! | Dimension        | Rule                                                        |
//! |------------------|-------------------------------------------------------------|
//! | `completeness`   | +8 name, +8 tax id, +5 address, +4 positive amount          |
//! | `validity`       | tax id 10-14 digits: +15, other: +5, absent: +8; +10 if typed |
//! | `consistency`    | fixed 15, no local signal                                   |
//! | `no_fraud_signs` | fixed 15, no local signal                                   |
//!
//! Each dimension tops out at 25, so the total stays within 0-100. The
//! result never overrides `is_credible`: it is always `score >= 60`.

use crate::patterns::is_valid_tax_id_format;
use crate::types::{
    format_amount, meets_threshold, Analysis, CategoryScores, DocumentRecord, EvaluationResult,
    ScoreBand, MAX_CATEGORY_SCORE,
};

/// Provenance tag written to `analysis.evaluated_by`.
pub const FALLBACK_EVALUATOR_NAME: &str = "Fallback Evaluator (Gemini unavailable)";

/// Prefix of the disclosure marker placed at `red_flags[0]`.
pub const FALLBACK_MARKER_PREFIX: &str = "⚠️ Đánh giá dự phòng: ";

/// Points for dimensions the fallback cannot assess locally.
pub const NEUTRAL_SCORE: u32 = 15;

const NAME_POINTS: u32 = 8;
const TAX_ID_POINTS: u32 = 8;
const ADDRESS_POINTS: u32 = 5;
const AMOUNT_POINTS: u32 = 4;
const VALID_TAX_ID_POINTS: u32 = 15;
const NONSTANDARD_TAX_ID_POINTS: u32 = 5;
const MISSING_TAX_ID_POINTS: u32 = 8;
const KNOWN_DOC_TYPE_POINTS: u32 = 10;

/// Deterministic evaluator used when the reasoning service is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackEvaluator;

/// Running score for one dimension, capped at `MAX_CATEGORY_SCORE`.
#[derive(Default)]
struct Tally {
    points: u32,
}

impl Tally {
    fn award(&mut self, points: u32) {
        self.points = (self.points + points).min(MAX_CATEGORY_SCORE);
    }
}

impl FallbackEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Score a document locally.
    ///
    /// `reason` explains why the fallback was used; it is embedded in the
    /// disclosure marker at `red_flags[0]`. Never fails.
    pub fn evaluate(&self, document: &DocumentRecord, reason: &str) -> EvaluationResult {
        let mut red_flags = vec![format!("{FALLBACK_MARKER_PREFIX}{reason}")];
        let mut positive_signs = Vec::new();

        let completeness = self.score_completeness(document, &mut red_flags, &mut positive_signs);
        let validity = self.score_validity(document, &mut red_flags, &mut positive_signs);

        let scores = CategoryScores::full(completeness, validity, NEUTRAL_SCORE, NEUTRAL_SCORE);
        let osint_score = scores.total();
        let band = ScoreBand::from_score(osint_score);

        EvaluationResult::new(
            osint_score,
            meets_threshold(osint_score),
            red_flags,
            positive_signs,
            Analysis {
                scores,
                summary: band.summary().to_string(),
                recommendation: band.recommendation().to_string(),
                evaluated_by: FALLBACK_EVALUATOR_NAME.to_string(),
                doc_type: document.doc_type.clone(),
            },
        )
    }

    fn score_completeness(
        &self,
        document: &DocumentRecord,
        red_flags: &mut Vec<String>,
        positive_signs: &mut Vec<String>,
    ) -> u32 {
        let debtor = &document.debtor;
        let mut tally = Tally::default();

        if debtor.name().is_some() {
            tally.award(NAME_POINTS);
            positive_signs.push("Có thông tin tên chủ sở hữu".to_string());
        } else {
            red_flags.push("Thiếu tên chủ sở hữu".to_string());
        }

        if debtor.tax_id().is_some() {
            tally.award(TAX_ID_POINTS);
            positive_signs.push("Có mã số thuế/CCCD".to_string());
        } else {
            red_flags.push("Thiếu mã số thuế/CCCD".to_string());
        }

        if debtor.address().is_some() {
            tally.award(ADDRESS_POINTS);
            positive_signs.push("Có địa chỉ".to_string());
        } else {
            red_flags.push("Thiếu địa chỉ".to_string());
        }

        // A missing amount is not a red flag: many document types carry none.
        if document.has_amount() {
            tally.award(AMOUNT_POINTS);
            positive_signs.push(format!(
                "Có giá trị tài liệu: {} {}",
                format_amount(document.amount),
                document.currency
            ));
        }

        tally.points
    }

    fn score_validity(
        &self,
        document: &DocumentRecord,
        red_flags: &mut Vec<String>,
        positive_signs: &mut Vec<String>,
    ) -> u32 {
        let mut tally = Tally::default();

        match document.debtor.tax_id() {
            Some(tax_id) if is_valid_tax_id_format(tax_id) => {
                tally.award(VALID_TAX_ID_POINTS);
                positive_signs.push("Mã số thuế có format hợp lệ".to_string());
            }
            Some(_) => {
                tally.award(NONSTANDARD_TAX_ID_POINTS);
                red_flags.push("Format mã số thuế có thể không chuẩn".to_string());
            }
            None => tally.award(MISSING_TAX_ID_POINTS),
        }

        if document.has_known_doc_type() {
            tally.award(KNOWN_DOC_TYPE_POINTS);
            positive_signs.push(format!("Loại tài liệu xác định: {}", document.doc_type));
        }

        tally.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Debtor;

    fn complete_invoice() -> DocumentRecord {
        let mut doc = DocumentRecord::new("INVOICE");
        doc.amount = 5_000_000.0;
        doc.debtor = Debtor {
            name: Some("Công ty TNHH ABC".to_string()),
            tax_id: Some("0312345678901".to_string()),
            address: Some("12 Lê Lợi, Quận 1, TP.HCM".to_string()),
        };
        doc
    }

    #[test]
    fn test_complete_invoice_scores_accept_band() {
        let result = FallbackEvaluator::new().evaluate(&complete_invoice(), "chưa cấu hình");

        assert_eq!(result.analysis.scores, CategoryScores::full(25, 25, 15, 15));
        assert_eq!(result.osint_score, 80);
        assert!(result.is_credible);
        assert!(!result.is_shell_company);
        assert_eq!(result.analysis.summary, ScoreBand::Accept.summary());
        assert_eq!(result.analysis.recommendation, ScoreBand::Accept.recommendation());
        assert_eq!(result.red_flags, vec!["⚠️ Đánh giá dự phòng: chưa cấu hình".to_string()]);
        assert_eq!(
            result.positive_signs,
            vec![
                "Có thông tin tên chủ sở hữu",
                "Có mã số thuế/CCCD",
                "Có địa chỉ",
                "Có giá trị tài liệu: 5,000,000 VND",
                "Mã số thuế có format hợp lệ",
                "Loại tài liệu xác định: INVOICE",
            ]
        );
    }

    #[test]
    fn test_empty_unknown_document_scores_reject_band() {
        let result = FallbackEvaluator::new().evaluate(&DocumentRecord::default(), "hết quota");

        assert_eq!(result.analysis.scores, CategoryScores::full(0, 8, 15, 15));
        assert_eq!(result.osint_score, 38);
        assert!(!result.is_credible);
        assert!(result.is_shell_company);
        assert_eq!(result.analysis.summary, ScoreBand::Reject.summary());
        assert_eq!(
            result.red_flags,
            vec![
                "⚠️ Đánh giá dự phòng: hết quota",
                "Thiếu tên chủ sở hữu",
                "Thiếu mã số thuế/CCCD",
                "Thiếu địa chỉ",
            ]
        );
        assert!(result.positive_signs.is_empty());
    }

    #[test]
    fn test_empty_typed_document_gets_type_bonus() {
        let result = FallbackEvaluator::new().evaluate(&DocumentRecord::new("INVOICE"), "x");
        assert_eq!(result.analysis.scores.validity, Some(18));
        assert_eq!(result.osint_score, 48);
        assert_eq!(result.analysis.summary, ScoreBand::ReviewClosely.summary());
    }

    #[test]
    fn test_nonstandard_tax_id_is_flagged() {
        let mut doc = complete_invoice();
        doc.debtor.tax_id = Some("12345".to_string());

        let result = FallbackEvaluator::new().evaluate(&doc, "x");

        assert_eq!(result.analysis.scores.validity, Some(15));
        assert_eq!(result.osint_score, 70);
        assert_eq!(result.analysis.summary, ScoreBand::AcceptWithReview.summary());
        assert!(result
            .red_flags
            .contains(&"Format mã số thuế có thể không chuẩn".to_string()));
    }

    #[test]
    fn test_tax_id_separators_are_ignored() {
        let mut doc = complete_invoice();
        doc.debtor.tax_id = Some("0312-345-678".to_string());

        let result = FallbackEvaluator::new().evaluate(&doc, "x");
        assert_eq!(result.analysis.scores.validity, Some(25));
    }

    #[test]
    fn test_marker_is_first_red_flag() {
        let result = FallbackEvaluator::new().evaluate(&DocumentRecord::default(), "lý do");
        assert!(result.red_flags[0].starts_with(FALLBACK_MARKER_PREFIX));
        assert!(result.red_flags[0].ends_with("lý do"));
    }

    #[test]
    fn test_provenance_and_doc_type_echo() {
        let result = FallbackEvaluator::new().evaluate(&complete_invoice(), "x");
        assert_eq!(result.analysis.evaluated_by, FALLBACK_EVALUATOR_NAME);
        assert_eq!(result.analysis.doc_type, "INVOICE");
    }

    #[test]
    fn test_amount_uses_document_currency() {
        let mut doc = complete_invoice();
        doc.currency = "USD".to_string();
        doc.amount = 1200.0;

        let result = FallbackEvaluator::new().evaluate(&doc, "x");
        assert!(result
            .positive_signs
            .contains(&"Có giá trị tài liệu: 1,200 USD".to_string()));
    }
}
