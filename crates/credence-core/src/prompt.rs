//! Prompt construction for the external reasoning service.
//!
//! The prompt has four parts, in order:
//! 1. Role and task framing
//! 2. The document's identifying fields and its free-form attributes
//! 3. The scoring rubric (four dimensions, 0-25 each)
//! 4. The output directive: a bare JSON object, nothing else
//!
//! Building is pure: the same document always yields the same text.

use crate::types::{format_amount, DocumentRecord};

/// Placeholder for a missing identifier or debtor field.
pub const MISSING_FIELD: &str = "N/A";

/// Placeholder for a missing document name.
pub const UNNAMED_DOCUMENT: &str = "Không xác định";

/// Role and task framing.
pub const ROLE_PROMPT: &str = r#"Bạn là chuyên gia đánh giá độ uy tín tài liệu và chống gian lận.

Nhiệm vụ: Phân tích dữ liệu sau đã được trích xuất từ tài liệu qua OCR và đánh giá độ tin cậy."#;

/// Scoring rubric. The four dimensions map onto `CategoryScores`.
pub const RUBRIC_PROMPT: &str = r#"=== TIÊU CHÍ ĐÁNH GIÁ ===
Hãy đánh giá độ uy tín dựa trên:

1. **Tính đầy đủ (0-25 điểm)**:
   - Thông tin có đầy đủ các trường quan trọng không?
   - Có bị thiếu dữ liệu cần thiết không?

2. **Tính hợp lệ (0-25 điểm)**:
   - Format dữ liệu có đúng chuẩn không? (MST, SĐT, địa chỉ, ngày tháng...)
   - Các số liệu có hợp lý không?

3. **Tính nhất quán (0-25 điểm)**:
   - Thông tin có mâu thuẫn nhau không?
   - Địa chỉ, biển số, vùng miền có khớp nhau không?

4. **Dấu hiệu đáng ngờ (0-25 điểm)**:
   - Có dấu hiệu giả mạo, chỉnh sửa không?
   - Giá trị có bất thường so với thị trường không?
   - Có giống tên công ty lớn để lừa đảo không?"#;

/// Output directive. Keys must match `ServiceAssessment`.
pub const OUTPUT_FORMAT_PROMPT: &str = r#"=== YÊU CẦU OUTPUT ===
Trả về JSON với cấu trúc sau (KHÔNG thêm text khác):
{
    "total_score": <số từ 0-100>,
    "is_credible": <true nếu score >= 60>,
    "scores": {
        "completeness": <0-25>,
        "validity": <0-25>,
        "consistency": <0-25>,
        "no_fraud_signs": <0-25>
    },
    "red_flags": [
        "Mô tả ngắn gọn từng vấn đề phát hiện"
    ],
    "positive_signs": [
        "Mô tả ngắn gọn điểm tích cực"
    ],
    "summary": "Tóm tắt 2-3 câu về đánh giá tổng thể",
    "recommendation": "Khuyến nghị: CHẤP NHẬN / CẦN XEM XÉT / TỪ CHỐI + lý do ngắn"
}"#;

/// Build the full evaluation prompt for a document.
pub fn build_prompt(document: &DocumentRecord) -> String {
    format!(
        "{ROLE_PROMPT}\n\n{}\n\n{RUBRIC_PROMPT}\n\n{OUTPUT_FORMAT_PROMPT}\n",
        render_document(document)
    )
}

/// Render the document section: identifying fields, owner, attributes.
pub fn render_document(document: &DocumentRecord) -> String {
    let debtor = &document.debtor;

    format!(
        "=== DỮ LIỆU TÀI LIỆU ===\n\
         Loại tài liệu: {doc_type}\n\
         Tên tài liệu: {doc_name}\n\
         Mã/Số tài liệu: {invoice}\n\
         Giá trị: {amount} {currency}\n\
         \n\
         --- THÔNG TIN CHỦ SỞ HỮU ---\n\
         Tên: {name}\n\
         Mã số thuế/CCCD: {tax_id}\n\
         Địa chỉ: {address}\n\
         \n\
         --- CHI TIẾT THUỘC TÍNH ---\n\
         {attributes}",
        doc_type = document.doc_type,
        doc_name = non_blank(document.doc_name.as_deref()).unwrap_or(UNNAMED_DOCUMENT),
        invoice = non_blank(document.invoice_number.as_deref()).unwrap_or(MISSING_FIELD),
        amount = format_amount(document.amount),
        currency = document.currency,
        name = debtor.name().unwrap_or(MISSING_FIELD),
        tax_id = debtor.tax_id().unwrap_or(MISSING_FIELD),
        address = debtor.address().unwrap_or(MISSING_FIELD),
        attributes = render_attributes(document),
    )
}

/// Attributes as indented JSON, non-ASCII text kept as-is.
fn render_attributes(document: &DocumentRecord) -> String {
    serde_json::to_string_pretty(&document.attributes).unwrap_or_else(|_| "{}".to_string())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
