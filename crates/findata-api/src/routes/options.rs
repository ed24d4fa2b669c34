//! 옵션 가격 계산 endpoint.
//!
//! Black-Scholes-Merton 모델로 유럽형 옵션의 이론가와 그릭스를
//! 계산합니다.
//! POST /api/options/price

use axum::{routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use findata_analytics::black_scholes::{price_greeks, OptionType};

use crate::error::ApiError;
use crate::state::AppState;

/// 옵션 가격 계산 요청.
#[derive(Debug, Deserialize)]
pub struct OptionPriceRequest {
    /// 현재 기초자산 가격
    pub stock_price: f64,
    /// 행사가
    pub strike_price: f64,
    /// 만기까지의 시간 (연 단위)
    pub time_to_maturity: f64,
    /// 무위험 이자율 (연 단위)
    pub risk_free_rate: f64,
    /// 변동성 (연 단위)
    pub volatility: f64,
    /// 연속 배당수익률 (기본 0)
    #[serde(default)]
    pub dividend_yield: f64,
    /// 옵션 유형 ("call" 또는 "put")
    pub option_type: String,
}

/// 옵션 가격 계산 응답. 모든 값은 소수점 4자리로 반올림됩니다.
#[derive(Debug, Serialize, Deserialize)]
pub struct OptionPriceResponse {
    pub success: bool,
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
    pub rho: f64,
}

/// 옵션 가격 계산 핸들러.
pub async fn calculate_option(
    Json(request): Json<OptionPriceRequest>,
) -> Result<Json<OptionPriceResponse>, ApiError> {
    let option_type: OptionType = request
        .option_type
        .parse()
        .map_err(ApiError::InvalidInput)?;

    let greeks = price_greeks(
        request.stock_price,
        request.strike_price,
        request.time_to_maturity,
        request.risk_free_rate,
        request.volatility,
        request.dividend_yield,
        option_type,
    )?;

    Ok(Json(OptionPriceResponse {
        success: true,
        price: round4(greeks.price),
        delta: round4(greeks.delta),
        gamma: round4(greeks.gamma),
        vega: round4(greeks.vega),
        theta: round4(greeks.theta),
        rho: round4(greeks.rho),
    }))
}

/// 옵션 라우터 생성.
pub fn options_router() -> Router<Arc<AppState>> {
    Router::new().route("/price", post(calculate_option))
}

/// 소수점 4자리 반올림.
fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn test_app() -> Router {
        Router::new()
            .nest("/api/options", options_router())
            .with_state(Arc::new(create_test_state()))
    }

    fn price_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/options/price")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_calculate_call_option() {
        let response = test_app()
            .oneshot(price_request(serde_json::json!({
                "stock_price": 100.0,
                "strike_price": 100.0,
                "time_to_maturity": 1.0,
                "risk_free_rate": 0.05,
                "volatility": 0.2,
                "option_type": "call"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let result: OptionPriceResponse = serde_json::from_slice(&body).unwrap();

        assert!(result.success);
        // 교과서 기준값: 10.4506
        assert!((result.price - 10.4506).abs() < 1e-3);
        assert!(result.delta > 0.0 && result.delta < 1.0);
    }

    #[tokio::test]
    async fn test_expired_option_returns_intrinsic_value() {
        let response = test_app()
            .oneshot(price_request(serde_json::json!({
                "stock_price": 110.0,
                "strike_price": 100.0,
                "time_to_maturity": 0.0,
                "risk_free_rate": 0.05,
                "volatility": 0.2,
                "option_type": "call"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let result: OptionPriceResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(result.price, 10.0);
        assert_eq!(result.delta, 1.0);
        assert_eq!(result.gamma, 0.0);
    }

    #[tokio::test]
    async fn test_invalid_option_type_rejected() {
        let response = test_app()
            .oneshot(price_request(serde_json::json!({
                "stock_price": 100.0,
                "strike_price": 100.0,
                "time_to_maturity": 1.0,
                "risk_free_rate": 0.05,
                "volatility": 0.2,
                "option_type": "straddle"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let result: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(result["success"], false);
    }

    #[tokio::test]
    async fn test_negative_input_rejected() {
        let response = test_app()
            .oneshot(price_request(serde_json::json!({
                "stock_price": -100.0,
                "strike_price": 100.0,
                "time_to_maturity": 1.0,
                "risk_free_rate": 0.05,
                "volatility": 0.2,
                "option_type": "put"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
