//! API 에러 타입.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// API 에러.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 잘못된 요청 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 내부 서버 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

impl From<findata_core::FindataError> for ApiError {
    fn from(err: findata_core::FindataError) -> Self {
        match err {
            findata_core::FindataError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
