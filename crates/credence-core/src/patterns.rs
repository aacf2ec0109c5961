//! Shared text patterns.
//!
//! Used by the fallback evaluator (tax id normalisation) and the response
//! parser (Markdown fence removal).

use lazy_static::lazy_static;
use regex::Regex;

/// Shortest digit count accepted for a tax code / citizen id.
pub const TAX_ID_MIN_DIGITS: usize = 10;

/// Longest digit count accepted for a tax code / citizen id.
pub const TAX_ID_MAX_DIGITS: usize = 14;

lazy_static! {
    /// Anything that is not a decimal digit
    pub static ref NON_DIGIT_PATTERN: Regex = Regex::new(r"[^0-9]").unwrap();

    /// Markdown code fence marker, with or without a `json` tag
    pub static ref CODE_FENCE_PATTERN: Regex = Regex::new(r"```(?:json)?").unwrap();
}

/// Keep only the ASCII digits of a value (`"0312-345-678"` -> `"0312345678"`).
pub fn digits_only(value: &str) -> String {
    NON_DIGIT_PATTERN.replace_all(value, "").into_owned()
}

/// Whether a tax id has a plausible length once separators are removed.
///
/// Vietnamese tax codes are 10 digits (13 with a branch suffix); citizen
/// ids are 12. Anything in 10..=14 digits is accepted.
pub fn is_valid_tax_id_format(tax_id: &str) -> bool {
    let digits = digits_only(tax_id);
    (TAX_ID_MIN_DIGITS..=TAX_ID_MAX_DIGITS).contains(&digits.len())
}

/// Remove Markdown code fences and surrounding whitespace.
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE_PATTERN.replace_all(text, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("0312-345-678"), "0312345678");
        assert_eq!(digits_only("MST: 0312345678-001"), "0312345678001");
        assert_eq!(digits_only("abc"), "");
    }

    #[test]
    fn test_tax_id_format() {
        assert!(is_valid_tax_id_format("0312345678"));
        assert!(is_valid_tax_id_format("0312345678901"));
        assert!(is_valid_tax_id_format("0312 345 678 9012"));
        assert!(!is_valid_tax_id_format("123456789"));
        assert!(!is_valid_tax_id_format("123456789012345"));
        assert!(!is_valid_tax_id_format("not a number"));
    }

    #[test]
    fn test_strip_json_fence() {
        let text = "```json\n{\"total_score\": 70}\n```";
        assert_eq!(strip_code_fences(text), "{\"total_score\": 70}");
    }

    #[test]
    fn test_strip_plain_fence() {
        let text = "```\n{\"total_score\": 70}\n```\n";
        assert_eq!(strip_code_fences(text), "{\"total_score\": 70}");
    }

    #[test]
    fn test_unfenced_text_is_trimmed() {
        assert_eq!(strip_code_fences("  {\"a\": 1}\n"), "{\"a\": 1}");
    }
}
