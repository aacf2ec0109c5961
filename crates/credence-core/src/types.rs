//! Core types for credibility evaluation.
//!
//! `DocumentRecord` mirrors the JSON the OCR stage hands to the pipeline.
//! `EvaluationResult` is the canonical output shape, identical whichever
//! path (external service or fallback) produced it.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

/// Sentinel `doc_type` meaning the document was not classified.
pub const UNKNOWN_DOC_TYPE: &str = "UNKNOWN";

/// Currency assumed when the OCR stage did not report one.
pub const DEFAULT_CURRENCY: &str = "VND";

/// Minimum total score for a document to count as credible.
pub const CREDIBILITY_THRESHOLD: u32 = 60;

/// Ceiling of each of the four sub-scores.
pub const MAX_CATEGORY_SCORE: u32 = 25;

/// Structured data extracted from a scanned document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Free-form document type tag ("INVOICE", "VEHICLE_REGISTRATION", ...)
    #[serde(default = "default_doc_type", deserialize_with = "doc_type_or_unknown")]
    pub doc_type: String,

    /// Display name of the document
    #[serde(default)]
    pub doc_name: Option<String>,

    /// Invoice number or other document identifier
    #[serde(default, rename = "invoiceNumber", deserialize_with = "loose_string")]
    pub invoice_number: Option<String>,

    /// Face value of the document
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount: f64,

    /// Currency of `amount`
    #[serde(default = "default_currency", deserialize_with = "currency_or_default")]
    pub currency: String,

    /// Owner / debtor named on the document
    #[serde(default, deserialize_with = "null_as_default")]
    pub debtor: Debtor,

    /// Document-type specific fields, passed through to the prompt verbatim
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: BTreeMap<String, JsonValue>,
}

fn default_doc_type() -> String {
    UNKNOWN_DOC_TYPE.to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

// OCR stages write `null` for fields they could not read.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn doc_type_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_doc_type))
}

fn currency_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_currency))
}

impl Default for DocumentRecord {
    fn default() -> Self {
        Self {
            doc_type: default_doc_type(),
            doc_name: None,
            invoice_number: None,
            amount: 0.0,
            currency: default_currency(),
            debtor: Debtor::default(),
            attributes: BTreeMap::new(),
        }
    }
}

impl DocumentRecord {
    /// Create an empty record of the given type.
    pub fn new(doc_type: impl Into<String>) -> Self {
        Self {
            doc_type: doc_type.into(),
            ..Default::default()
        }
    }

    /// Parse a record from the OCR stage's JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// True when the document carries a real classification.
    pub fn has_known_doc_type(&self) -> bool {
        let doc_type = self.doc_type.trim();
        !doc_type.is_empty() && doc_type != UNKNOWN_DOC_TYPE
    }

    /// True when the amount is a positive, finite number.
    pub fn has_amount(&self) -> bool {
        self.amount.is_finite() && self.amount > 0.0
    }
}

/// Owner of the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debtor {
    #[serde(default, deserialize_with = "loose_string")]
    pub name: Option<String>,

    /// Tax code (MST) or citizen id (CCCD)
    #[serde(default, deserialize_with = "loose_string")]
    pub tax_id: Option<String>,

    #[serde(default, deserialize_with = "loose_string")]
    pub address: Option<String>,
}

impl Debtor {
    pub fn name(&self) -> Option<&str> {
        present(&self.name)
    }

    pub fn tax_id(&self) -> Option<&str> {
        present(&self.tax_id)
    }

    pub fn address(&self) -> Option<&str> {
        present(&self.address)
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Accept strings, numbers and null. OCR output often types ids as numbers.
fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<JsonValue>::deserialize(deserializer)? {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s)),
        Some(JsonValue::Number(n)) => Ok(Some(n.to_string())),
        Some(JsonValue::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number, found {}",
            other
        ))),
    }
}

/// The four scoring dimensions, each 0-25.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScores {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completeness: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consistency: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_fraud_signs: Option<u32>,
}

impl CategoryScores {
    /// Scores with all four dimensions set.
    pub fn full(completeness: u32, validity: u32, consistency: u32, no_fraud_signs: u32) -> Self {
        Self {
            completeness: Some(completeness),
            validity: Some(validity),
            consistency: Some(consistency),
            no_fraud_signs: Some(no_fraud_signs),
        }
    }

    /// True when every dimension has a value.
    pub fn is_complete(&self) -> bool {
        self.values().iter().all(Option::is_some)
    }

    /// True when no dimension has a value.
    pub fn is_empty(&self) -> bool {
        self.values().iter().all(Option::is_none)
    }

    /// Sum of the dimensions that are present.
    pub fn total(&self) -> u32 {
        self.values().iter().flatten().sum()
    }

    fn values(&self) -> [Option<u32>; 4] {
        [
            self.completeness,
            self.validity,
            self.consistency,
            self.no_fraud_signs,
        ]
    }
}

/// Threshold band of a total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreBand {
    /// >= 80
    Accept,
    /// [60, 80)
    AcceptWithReview,
    /// [40, 60)
    ReviewClosely,
    /// < 40
    Reject,
}

impl ScoreBand {
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => Self::Accept,
            60..=79 => Self::AcceptWithReview,
            40..=59 => Self::ReviewClosely,
            _ => Self::Reject,
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Self::Accept => "Tài liệu có đầy đủ thông tin cơ bản và format hợp lệ.",
            Self::AcceptWithReview => {
                "Tài liệu có hầu hết thông tin cần thiết, một số điểm cần xác minh thêm."
            }
            Self::ReviewClosely => "Tài liệu thiếu một số thông tin quan trọng.",
            Self::Reject => "Tài liệu thiếu nhiều thông tin quan trọng, không đủ cơ sở đánh giá.",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Accept => "CHẤP NHẬN - Thông tin đầy đủ và hợp lệ",
            Self::AcceptWithReview => "CẦN XEM XÉT - Nên xác minh thêm một số thông tin",
            Self::ReviewClosely => "CẦN XEM XÉT KỸ - Thiếu nhiều thông tin",
            Self::Reject => "TỪ CHỐI - Thông tin không đầy đủ",
        }
    }
}

/// Supporting detail for an evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub scores: CategoryScores,
    pub summary: String,
    pub recommendation: String,

    /// Which evaluator produced the result
    pub evaluated_by: String,

    /// `doc_type` echoed from the input
    pub doc_type: String,
}

/// Canonical credibility verdict for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Trust score, 0-100
    pub osint_score: u32,

    pub is_credible: bool,

    /// Always `!is_credible`; kept for older consumers
    pub is_shell_company: bool,

    /// Detected issues, in detection order
    pub red_flags: Vec<String>,

    pub positive_signs: Vec<String>,

    pub analysis: Analysis,
}

impl EvaluationResult {
    /// Build a result, deriving `is_shell_company` from `is_credible`.
    pub fn new(
        osint_score: u32,
        is_credible: bool,
        red_flags: Vec<String>,
        positive_signs: Vec<String>,
        analysis: Analysis,
    ) -> Self {
        Self {
            osint_score,
            is_credible,
            is_shell_company: !is_credible,
            red_flags,
            positive_signs,
            analysis,
        }
    }

    /// Serialise to the pipeline's JSON shape.
    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}

/// Whether a total score meets the credibility threshold.
pub fn meets_threshold(score: u32) -> bool {
    score >= CREDIBILITY_THRESHOLD
}

/// Format an amount with thousands separators and no decimals (`5,000,000`).
pub fn format_amount(amount: f64) -> String {
    let rounded = if amount.is_finite() { amount.round() } else { 0.0 };
    let negative = rounded < 0.0;
    let digits = format!("{}", rounded.abs() as u64);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if negative {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
