//! 데이터 수집 시스템의 에러 타입.
//!
//! 이 모듈은 시스템 전반에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum FindataError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 데이터 제공자 에러 (AlphaVantage, FMP, FRED 등)
    #[error("데이터 제공자 에러: {0}")]
    Provider(String),

    /// 요청 한도 초과
    #[error("요청 한도 초과: {0}")]
    RateLimit(String),

    /// 네트워크 에러
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 데이터베이스 에러
    #[error("데이터베이스 에러: {0}")]
    Database(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 수집 작업을 위한 Result 타입.
pub type FindataResult<T> = Result<T, FindataError>;

impl FindataError {
    /// 재시도 가능한 에러인지 확인합니다.
    ///
    /// 네트워크 오류와 API 요청 한도 초과는 지연 후 재시도할 수 있습니다.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FindataError::Network(_) | FindataError::RateLimit(_)
        )
    }
}

impl From<serde_json::Error> for FindataError {
    fn from(err: serde_json::Error) -> Self {
        FindataError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        let network_err = FindataError::Network("timeout".to_string());
        assert!(network_err.is_retryable());

        let rate_err = FindataError::RateLimit("5 req/min exceeded".to_string());
        assert!(rate_err.is_retryable());

        let config_err = FindataError::Config("missing key".to_string());
        assert!(!config_err.is_retryable());
    }
}
