//! Error types for Tally
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Tally 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 비용 계산 관련
    // ========================================================================
    /// 선택된 모델에 가격 정보가 없음 (0으로 대체하지 않음)
    #[error("No pricing registered for model: {0}")]
    PricingUnavailable(String),

    // ========================================================================
    // 컨텍스트 저장/복원 관련
    // ========================================================================
    #[error("Document type has no context encoding: {0}")]
    UnsupportedDocument(String),

    #[error("Saved context cannot be parsed: {0}")]
    CorruptPersistedContext(String),

    // ========================================================================
    // 사용자 상호작용
    // ========================================================================
    #[error("Declined: {0}")]
    UserDeclined(String),

    // ========================================================================
    // 일반
    // ========================================================================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 사용자에게 그대로 보여줄 수 있는 에러인지 확인
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::PricingUnavailable(_)
                | Error::UnsupportedDocument(_)
                | Error::CorruptPersistedContext(_)
                | Error::UserDeclined(_)
                | Error::NotFound(_)
                | Error::InvalidInput(_)
        )
    }

    /// 상태 변경 없이 중단되었음이 보장되는 에러인지 확인
    ///
    /// 컨텍스트 목록, 비용 캐시, 문서 내용 모두 호출 전 상태 그대로입니다.
    pub fn aborts_cleanly(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedDocument(_)
                | Error::CorruptPersistedContext(_)
                | Error::UserDeclined(_)
        )
    }

    /// 손상된 저장 컨텍스트 에러 생성 헬퍼
    pub fn corrupt(detail: impl Into<String>) -> Self {
        Error::CorruptPersistedContext(detail.into())
    }

    /// 확인 거부 에러 생성 헬퍼
    pub fn declined(prompt: impl Into<String>) -> Self {
        Error::UserDeclined(prompt.into())
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}
