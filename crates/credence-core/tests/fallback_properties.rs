//! Property tests for the fallback evaluator and the result shape.

use credence_core::types::MAX_CATEGORY_SCORE;
use credence_core::{
    build_prompt, Debtor, DocumentRecord, FallbackEvaluator, FALLBACK_MARKER_PREFIX,
};
use proptest::prelude::*;

fn optional_text() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        "[a-zA-Z ]{1,24}",
        "\\PC{0,32}",
    ])
}

fn optional_tax_id() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof!["[0-9]{0,20}", "[0-9 .-]{0,24}", "\\PC{0,16}"])
}

fn doc_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("UNKNOWN".to_string()),
        Just(String::new()),
        Just("INVOICE".to_string()),
        "[A-Z_]{1,20}",
    ]
}

fn amount() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(0.0),
        0.0f64..1e12,
        Just(f64::NAN),
        Just(-5.0),
    ]
}

prop_compose! {
    fn document()(
        doc_type in doc_type(),
        doc_name in optional_text(),
        invoice_number in optional_text(),
        amount in amount(),
        name in optional_text(),
        tax_id in optional_tax_id(),
        address in optional_text(),
    ) -> DocumentRecord {
        DocumentRecord {
            doc_type,
            doc_name,
            invoice_number,
            amount,
            debtor: Debtor { name, tax_id, address },
            ..DocumentRecord::default()
        }
    }
}

proptest! {
    #[test]
    fn score_is_bounded(doc in document()) {
        let result = FallbackEvaluator::new().evaluate(&doc, "reason");
        prop_assert!(result.osint_score <= 100);
    }

    #[test]
    fn credibility_follows_threshold(doc in document()) {
        let result = FallbackEvaluator::new().evaluate(&doc, "reason");
        prop_assert_eq!(result.is_credible, result.osint_score >= 60);
    }

    #[test]
    fn shell_company_mirrors_credibility(doc in document()) {
        let result = FallbackEvaluator::new().evaluate(&doc, "reason");
        prop_assert_eq!(result.is_shell_company, !result.is_credible);
    }

    #[test]
    fn evaluation_is_deterministic(doc in document(), reason in "\\PC{0,40}") {
        let evaluator = FallbackEvaluator::new();
        let first = serde_json::to_string(&evaluator.evaluate(&doc, &reason)).unwrap();
        let second = serde_json::to_string(&evaluator.evaluate(&doc, &reason)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn sub_scores_sum_to_total(doc in document()) {
        let result = FallbackEvaluator::new().evaluate(&doc, "reason");
        let scores = &result.analysis.scores;

        prop_assert!(scores.is_complete());
        prop_assert_eq!(scores.total(), result.osint_score);
        for value in [
            scores.completeness,
            scores.validity,
            scores.consistency,
            scores.no_fraud_signs,
        ] {
            prop_assert!(value.unwrap_or_default() <= MAX_CATEGORY_SCORE);
        }
    }

    #[test]
    fn disclosure_marker_leads_red_flags(doc in document(), reason in "\\PC{0,40}") {
        let result = FallbackEvaluator::new().evaluate(&doc, &reason);
        prop_assert_eq!(&result.red_flags[0], &format!("{FALLBACK_MARKER_PREFIX}{reason}"));
    }

    #[test]
    fn prompt_is_deterministic(doc in document()) {
        prop_assert_eq!(build_prompt(&doc), build_prompt(&doc));
    }
}
