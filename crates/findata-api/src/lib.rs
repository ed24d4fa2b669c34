//! FinData HTTP API 서버.
//!
//! 수집 시스템과 독립적으로 동작하는 얇은 API 레이어입니다:
//! - 헬스 체크 (liveness / readiness)
//! - Black-Scholes-Merton 옵션 가격 계산

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::AppState;
