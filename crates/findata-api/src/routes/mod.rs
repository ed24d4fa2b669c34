//! HTTP 라우트.

pub mod health;
pub mod options;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// 전체 라우터 조립.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/health", health::health_router())
        .nest("/api/options", options::options_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
