//! Binance 공개 시세 API 클라이언트.
//!
//! 암호화폐 일봉 수집용. 서명이 필요 없는 공개 market data
//! endpoint만 사용합니다.
//!
//! 심볼은 `BTC/USDT` 형태로 받아 API 호출 시 `BTCUSDT`로
//! 정규화하고, 저장/파일명에는 원래 형태를 유지합니다.

use chrono::{DateTime, NaiveDate, Utc};
use findata_core::DailyBar;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::{DataError, Result};

/// Binance 공개 시세 클라이언트.
#[derive(Clone)]
pub struct BinanceClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for BinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BinanceClient {
    /// 새로운 클라이언트 생성.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            base_url: "https://api.binance.com".to_string(),
        }
    }

    /// 기본 URL 교체 (테스트용).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 일봉 조회.
    ///
    /// # Arguments
    /// * `pair` - 거래쌍 (예: "BTC/USDT")
    /// * `since` - 조회 시작 시각
    /// * `limit` - 최대 캔들 수 (Binance 최대 1000)
    pub async fn fetch_daily_klines(
        &self,
        pair: &str,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<DailyBar>> {
        let api_symbol = normalize_pair(pair);
        let url = format!("{}/api/v3/klines", self.base_url);

        let start_time = since.timestamp_millis().to_string();
        let limit_str = limit.min(1000).to_string();

        tracing::debug!(pair = pair, api_symbol = %api_symbol, "Binance 일봉 요청");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", api_symbol.as_str()),
                ("interval", "1d"),
                ("startTime", start_time.as_str()),
                ("limit", limit_str.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::FetchError(format!(
                "Binance klines {} [{}]: {}",
                api_symbol,
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let raw: Vec<Vec<Value>> = response.json().await?;
        let bars = parse_klines(pair, &raw);

        tracing::info!(pair = pair, count = bars.len(), "암호화폐 일봉 조회 완료");
        Ok(bars)
    }
}

/// 거래쌍을 Binance API 심볼로 정규화 (`BTC/USDT` → `BTCUSDT`).
pub fn normalize_pair(pair: &str) -> String {
    pair.replace('/', "").to_uppercase()
}

/// klines 배열 응답 파싱.
///
/// 각 캔들은 `[openTime(ms), open, high, low, close, volume, ...]`
/// 형태이며 가격/거래량은 문자열입니다.
fn parse_klines(pair: &str, raw: &[Vec<Value>]) -> Vec<DailyBar> {
    raw.iter()
        .filter_map(|candle| {
            let open_time = candle.first()?.as_i64()?;
            let date = timestamp_ms_to_date(open_time)?;
            Some(DailyBar {
                symbol: pair.to_string(),
                date,
                open: candle_decimal(candle, 1),
                high: candle_decimal(candle, 2),
                low: candle_decimal(candle, 3),
                close: candle_decimal(candle, 4),
                volume: candle_decimal(candle, 5),
            })
        })
        .collect()
}

/// 캔들 배열의 i번째 문자열 값을 Decimal로 파싱.
fn candle_decimal(candle: &[Value], index: usize) -> Option<Decimal> {
    candle.get(index)?.as_str()?.parse().ok()
}

/// 밀리초 타임스탬프를 날짜로 변환.
fn timestamp_ms_to_date(ms: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(ms).map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_pair() {
        assert_eq!(normalize_pair("BTC/USDT"), "BTCUSDT");
        assert_eq!(normalize_pair("eth/usdt"), "ETHUSDT");
        assert_eq!(normalize_pair("SOLUSDT"), "SOLUSDT");
    }

    #[test]
    fn test_parse_klines() {
        // 2024-01-02 00:00:00 UTC = 1704153600000 ms
        let raw: Vec<Vec<Value>> = serde_json::from_str(
            r#"[
                [1704153600000, "44200.01", "45500.00", "44000.00", "44950.50", "28123.4", 1704239999999, "0", 0, "0", "0", "0"],
                ["invalid"]
            ]"#,
        )
        .unwrap();

        let bars = parse_klines("BTC/USDT", &raw);

        assert_eq!(bars.len(), 1);
        let bar = &bars[0];
        assert_eq!(bar.symbol, "BTC/USDT");
        assert_eq!(bar.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bar.open, Some(dec!(44200.01)));
        assert_eq!(bar.close, Some(dec!(44950.50)));
        assert_eq!(bar.volume, Some(dec!(28123.4)));
    }

    #[test]
    fn test_timestamp_ms_to_date() {
        assert_eq!(
            timestamp_ms_to_date(0),
            Some(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
        );
    }
}
