//! FinData API 서버 entrypoint.

use std::sync::Arc;

use findata_api::{routes, AppState};
use findata_core::{init_logging, AppConfig, LogConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // 설정 로드 (파일 없으면 기본값)
    let config = AppConfig::load_default().unwrap_or_default();

    // 로깅 초기화
    let log_config = LogConfig {
        level: config.logging.level.clone(),
        format: config.logging.format.parse().unwrap_or_default(),
        ..Default::default()
    };
    init_logging(log_config).map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    // DB 연결 (옵션: 헬스 체크용, 없어도 옵션 계산은 동작)
    let db_pool = match std::env::var("DATABASE_URL") {
        Ok(url) => match sqlx::PgPool::connect(&url).await {
            Ok(pool) => {
                tracing::info!("데이터베이스 연결 성공");
                Some(pool)
            }
            Err(e) => {
                tracing::warn!(error = %e, "데이터베이스 연결 실패, DB 없이 시작");
                None
            }
        },
        Err(_) => {
            tracing::warn!("DATABASE_URL 미설정, DB 없이 시작");
            None
        }
    };

    let state = Arc::new(AppState::new(db_pool));
    let app = routes::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(addr = %addr, "FinData API 서버 시작");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
