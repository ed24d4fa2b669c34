//! 서버 공유 상태.

use sqlx::PgPool;
use std::time::Instant;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 데이터베이스 연결 풀 (미설정 시 None)
    pub db_pool: Option<PgPool>,
    /// API 버전
    pub version: String,
    /// 서버 시작 시각
    started_at: Instant,
}

impl AppState {
    /// 새로운 상태 생성.
    pub fn new(db_pool: Option<PgPool>) -> Self {
        Self {
            db_pool,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Instant::now(),
        }
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        self.started_at.elapsed().as_secs() as i64
    }

    /// 데이터베이스 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        match &self.db_pool {
            Some(pool) => sqlx::query("SELECT 1").execute(pool).await.is_ok(),
            None => false,
        }
    }
}

/// 테스트용 상태 생성 (DB 없음).
#[cfg(test)]
pub fn create_test_state() -> AppState {
    AppState::new(None)
}
