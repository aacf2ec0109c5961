//! Why an evaluation fell back to the local rule-based scorer.

use std::fmt;

/// Reason recorded in the fallback disclosure marker.
///
/// The `Display` text is what downstream consumers see in `red_flags[0]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No credential configured; the service was never called
    NotConfigured,

    /// Every attempt was rate limited
    QuotaExhausted,

    /// The service failed in a way that is not worth retrying
    ServiceError(String),

    /// The service answered, but not with a usable assessment
    MalformedResponse(String),

    /// The retry loop ended without an answer
    RetriesExhausted,
}

impl FallbackReason {
    /// Short machine-readable tag for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FallbackReason::NotConfigured => "not_configured",
            FallbackReason::QuotaExhausted => "quota_exhausted",
            FallbackReason::ServiceError(_) => "service_error",
            FallbackReason::MalformedResponse(_) => "malformed_response",
            FallbackReason::RetriesExhausted => "retries_exhausted",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NotConfigured => write!(
                f,
                "Gemini API chưa được cấu hình. Vui lòng thêm GEMINI_API_KEY vào file .env"
            ),
            FallbackReason::QuotaExhausted => write!(f, "Gemini API hết quota tạm thời"),
            FallbackReason::ServiceError(e) => write!(f, "Lỗi Gemini API: {e}"),
            FallbackReason::MalformedResponse(e) => {
                write!(f, "Phản hồi Gemini không hợp lệ: {e}")
            }
            FallbackReason::RetriesExhausted => {
                write!(f, "Không thể kết nối Gemini API sau nhiều lần thử")
            }
        }
    }
}
